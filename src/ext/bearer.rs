//! Bearer attachment for `reqwest` request builders.

// crates.io
use reqwest::{RequestBuilder, header::AUTHORIZATION};
// self
use crate::auth::{CachedCredential, TokenSecret};

/// Values that can be rendered as an `Authorization: Bearer` credential.
pub trait BearerToken {
	/// Token sent after the `Bearer` scheme.
	fn bearer_secret(&self) -> &TokenSecret;
}
impl BearerToken for TokenSecret {
	fn bearer_secret(&self) -> &TokenSecret {
		self
	}
}
impl BearerToken for CachedCredential {
	fn bearer_secret(&self) -> &TokenSecret {
		&self.token
	}
}

/// Adds `Authorization: Bearer <token>` to a [`RequestBuilder`].
pub trait BearerAuthExt {
	/// Sets the `Authorization` header from `credential`, replacing any earlier value.
	fn bearer_credential<T>(self, credential: &T) -> Self
	where
		T: ?Sized + BearerToken;
}
impl BearerAuthExt for RequestBuilder {
	fn bearer_credential<T>(self, credential: &T) -> Self
	where
		T: ?Sized + BearerToken,
	{
		self.header(AUTHORIZATION, credential.bearer_secret().bearer_header())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::_prelude::*;

	#[test]
	fn attaches_bearer_header_from_cached_credential() {
		let credential = CachedCredential::builder()
			.token(TokenSecret::new("abc.def.ghi"))
			.issued_at(macros::datetime!(2025-03-01 12:00 UTC))
			.expires_in(Duration::HOUR)
			.build()
			.expect("Credential fixture should build.");
		let request = ReqwestClient::new()
			.get("http://127.0.0.1/resource")
			.bearer_credential(&credential)
			.build()
			.expect("Request should build.");

		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("Bearer abc.def.ghi")
		);
	}
}
