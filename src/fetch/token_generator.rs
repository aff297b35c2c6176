//! Fetcher for the test token generator: Basic-auth `GET`, options as query parameters, raw
//! token in the body.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::FreshnessPolicy,
	config::TokenGeneratorConfig,
	error::{ConfigError, FetchError, ParseError},
	fetch::{CredentialFetcher, FetchFuture},
	http::{self, ReqwestHttpClient},
	request::CredentialRequest,
};

/// Fetches personal, enterprise and platform tokens from the token generator.
///
/// `env` and `ttl` default to the configured values when a request leaves them unset, and the
/// freshness TTL always matches the `ttl` actually sent.
#[derive(Clone, Debug)]
pub struct TokenGeneratorFetcher {
	config: TokenGeneratorConfig,
	http_client: ReqwestHttpClient,
}
impl TokenGeneratorFetcher {
	/// Creates a fetcher with its own redirect-free client honoring the configured timeout.
	pub fn new(config: TokenGeneratorConfig) -> Result<Self, ConfigError> {
		let http_client = ReqwestHttpClient::with_timeout(config.request_timeout)?;

		Ok(Self::with_http_client(config, http_client))
	}

	/// Creates a fetcher that reuses an existing HTTP client.
	pub fn with_http_client(config: TokenGeneratorConfig, http_client: ReqwestHttpClient) -> Self {
		Self { config, http_client }
	}

	/// Active configuration.
	pub fn config(&self) -> &TokenGeneratorConfig {
		&self.config
	}

	/// Requests a batch of tokens (`bulkCount`) and decodes the returned JSON object.
	///
	/// Bulk payloads are not cached; callers keep the map for the duration of their run.
	pub async fn fetch_bulk(&self, request: &CredentialRequest) -> Result<BTreeMap<String, String>> {
		let body = self.call(request).await?;

		Ok(parse_bulk_tokens(&body)?)
	}

	async fn call(&self, request: &CredentialRequest) -> Result<String> {
		let variant = request.variant();
		let endpoint = variant.token_generator_endpoint().ok_or(ConfigError::UnsupportedVariant {
			fetcher: "token generator",
			variant: variant.as_str(),
		})?;
		let url = self.config.endpoint_url(endpoint)?;
		let request = self.canonical_request(request);
		let query = request.options().collect::<Vec<_>>();
		let response = http::send(
			self.http_client
				.get(url)
				.basic_auth(&self.config.username, Some(self.config.password.expose()))
				.query(&query),
		)
		.await?;

		if response.status != 200 {
			return Err(FetchError {
				variant: variant.as_str(),
				status: response.status,
				body: response.body,
			}
			.into());
		}

		Ok(response.body)
	}
}
impl CredentialFetcher for TokenGeneratorFetcher {
	fn fetch<'a>(&'a self, request: &'a CredentialRequest) -> FetchFuture<'a, TokenSecret> {
		Box::pin(async move {
			let body = self.call(request).await?;
			let token = body.trim();

			if token.is_empty() {
				return Err(ParseError::EmptyBody.into());
			}

			Ok(TokenSecret::new(token))
		})
	}

	fn freshness(&self, request: &CredentialRequest) -> FreshnessPolicy {
		FreshnessPolicy::Ttl(request.ttl().unwrap_or(self.config.default_ttl))
	}

	fn canonical_request<'a>(&self, request: &'a CredentialRequest) -> Cow<'a, CredentialRequest> {
		if request.variant().token_generator_endpoint().is_none() {
			return Cow::Borrowed(request);
		}

		Cow::Owned(request.clone().with_defaults(&self.config.default_env, self.config.default_ttl))
	}
}

/// Decodes a bulk token payload (a JSON object of string tokens) into an ordered map.
pub fn parse_bulk_tokens(body: &str) -> Result<BTreeMap<String, String>, ParseError> {
	serde_json::from_str(body).map_err(|source| ParseError::BulkTokens { source })
}
