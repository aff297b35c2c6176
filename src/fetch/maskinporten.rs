//! Fetcher exchanging a signed JWT-bearer grant for an access token.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	cache::{Clock, FreshnessPolicy, SystemClock},
	config::MaskinportenConfig,
	error::{ConfigError, FetchError, ParseError},
	fetch::{AssertionSigner, CredentialFetcher, FetchFuture, JWT_BEARER_GRANT_TYPE},
	http::{self, ReqwestHttpClient},
	request::{CredentialRequest, CredentialVariant, ValidationError},
};

#[derive(Deserialize)]
struct AccessTokenResponse {
	access_token: String,
}

/// Fetches Maskinporten access tokens; their expiry is read from the token's `exp` claim.
#[derive(Clone)]
pub struct MaskinportenFetcher {
	config: MaskinportenConfig,
	signer: AssertionSigner,
	http_client: ReqwestHttpClient,
	clock: Arc<dyn Clock>,
}
impl MaskinportenFetcher {
	/// Decodes the signing key and creates a fetcher with its own redirect-free client.
	pub fn new(config: MaskinportenConfig) -> Result<Self, ConfigError> {
		let http_client = ReqwestHttpClient::with_timeout(config.request_timeout)?;

		Self::with_http_client(config, http_client)
	}

	/// Decodes the signing key and creates a fetcher that reuses an existing HTTP client.
	pub fn with_http_client(
		config: MaskinportenConfig,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let signer = AssertionSigner::new(
			config.client_id.clone(),
			config.key_id.clone(),
			config.audience.clone(),
			&config.encoded_jwk,
			config.assertion_lifetime,
		)?;

		Ok(Self { config, signer, http_client, clock: Arc::new(SystemClock) })
	}

	/// Replaces the clock used for the grant's `iat`/`exp` claims.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Active configuration.
	pub fn config(&self) -> &MaskinportenConfig {
		&self.config
	}

	async fn exchange(&self, request: &CredentialRequest) -> Result<TokenSecret> {
		let variant = request.variant();

		if variant != CredentialVariant::Maskinporten {
			return Err(ConfigError::UnsupportedVariant {
				fetcher: "maskinporten",
				variant: variant.as_str(),
			}
			.into());
		}

		let scope = request
			.scopes()
			.ok_or(ValidationError::MissingOption { variant, key: "scopes" })?;
		let assertion = self.signer.sign(&scope, self.clock.now())?;
		let response = http::send(
			self.http_client
				.post(self.config.token_url.clone())
				.form(&[("grant_type", JWT_BEARER_GRANT_TYPE), ("assertion", assertion.as_str())]),
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

		Ok(TokenSecret::new(parse_access_token(&response.body)?))
	}
}
impl CredentialFetcher for MaskinportenFetcher {
	fn fetch<'a>(&'a self, request: &'a CredentialRequest) -> FetchFuture<'a, TokenSecret> {
		Box::pin(self.exchange(request))
	}

	fn freshness(&self, _request: &CredentialRequest) -> FreshnessPolicy {
		FreshnessPolicy::ExpiryClaim
	}
}
impl Debug for MaskinportenFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MaskinportenFetcher")
			.field("token_url", &self.config.token_url.as_str())
			.field("signer", &self.signer)
			.finish()
	}
}

fn parse_access_token(body: &str) -> Result<String, ParseError> {
	if body.trim().is_empty() {
		return Err(ParseError::EmptyBody);
	}

	let de = &mut serde_json::Deserializer::from_str(body);
	let response: AccessTokenResponse = serde_path_to_error::deserialize(de)
		.map_err(|source| ParseError::TokenResponse { source })?;

	if response.access_token.trim().is_empty() {
		return Err(ParseError::EmptyBody);
	}

	Ok(response.access_token)
}
