//! Bearer credential cache for load-test runs: validated token requests, TTL and
//! expiry-claim freshness, plus token-generator and JWT-bearer fetchers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
#[cfg(feature = "reqwest")] pub mod ext;
pub mod fetch;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod request;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{ClientId, KeyId, TokenSecret},
		cache::ManualClock,
		config::{MaskinportenConfig, TokenGeneratorConfig},
		http::ReqwestHttpClient,
	};

	/// Username accepted by the mock token generator in integration tests.
	pub const TEST_USERNAME: &str = "loadtest-user";
	/// Password accepted by the mock token generator in integration tests.
	pub const TEST_PASSWORD: &str = "loadtest-pass";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Token generator configuration pointed at a mock server base URL.
	pub fn test_token_generator_config(base_url: &str) -> TokenGeneratorConfig {
		TokenGeneratorConfig::builder(TEST_USERNAME, TEST_PASSWORD)
			.base_url(Url::parse(base_url).expect("Mock base URL should parse."))
			.build()
			.expect("Token generator test configuration should be valid.")
	}

	/// JWT-bearer configuration pointed at a mock token endpoint and signing with `encoded_jwk`.
	pub fn test_maskinporten_config(token_url: &str, encoded_jwk: &str) -> MaskinportenConfig {
		MaskinportenConfig::builder(
			ClientId::new("loadtest-client").expect("Client fixture should be valid."),
			KeyId::new("loadtest-signing-key").expect("Key fixture should be valid."),
			TokenSecret::new(encoded_jwk),
		)
		.token_url(Url::parse(token_url).expect("Mock token URL should parse."))
		.build()
		.expect("Maskinporten test configuration should be valid.")
	}

	/// Manual clock pinned to a fixed instant so expiry assertions stay deterministic.
	pub fn test_clock() -> Arc<ManualClock> {
		Arc::new(ManualClock::new(time::macros::datetime!(2025-03-01 12:00 UTC)))
	}
}

mod _prelude {
	pub use std::{
		borrow::Cow,
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, proptest as _};
