//! Reqwest transport shared by the built-in fetchers.

// std
use std::ops::Deref;
// crates.io
use reqwest::{RequestBuilder, redirect::Policy};
// self
use crate::{_prelude::*, error::ConfigError};

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token endpoints answer directly, so clients built here never follow redirects. Apply the
/// same policy to any custom [`ReqwestClient`] passed to [`with_client`](Self::with_client).
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with a per-call `timeout` and redirects disabled.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let timeout = std::time::Duration::try_from(timeout)
			.ok()
			.filter(|timeout| !timeout.is_zero())
			.ok_or(ConfigError::NonPositiveDuration { field: "request_timeout" })?;
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.redirect(Policy::none())
			.build()
			.map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// Status code and text body of a completed token endpoint call.
#[derive(Clone, Debug)]
pub(crate) struct RawResponse {
	pub(crate) status: u16,
	pub(crate) body: String,
}

/// Sends `request` and buffers the whole response; any status is returned as-is.
pub(crate) async fn send(request: RequestBuilder) -> Result<RawResponse> {
	let response = request.send().await?;
	let status = response.status().as_u16();
	let body = response.text().await?;

	Ok(RawResponse { status, body })
}
