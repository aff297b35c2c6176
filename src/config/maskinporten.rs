// self
use super::{DEFAULT_REQUEST_TIMEOUT, positive, required, resolve_url};
use crate::{
	_prelude::*,
	auth::{ClientId, KeyId, TokenSecret},
	error::ConfigError,
};

/// Token endpoint of the Maskinporten test environment.
pub const DEFAULT_MASKINPORTEN_TOKEN_URL: &str = "https://test.maskinporten.no/token";
/// Audience expected in grants sent to the test environment.
pub const DEFAULT_MASKINPORTEN_AUDIENCE: &str = "https://test.maskinporten.no/";
/// Lifetime of each signed grant.
pub const DEFAULT_ASSERTION_LIFETIME: Duration = Duration::seconds(120);

/// Variable holding the signing key id.
pub const MASKINPORTEN_KEY_ID: &str = "MACHINEPORTEN_KID";
/// Variable holding the registered client id.
pub const MASKINPORTEN_CLIENT_ID: &str = "MACHINEPORTEN_CLIENT_ID";
/// Variable holding the base64-encoded private JWK.
pub const MASKINPORTEN_ENCODED_JWK: &str = "ENCODED_JWK";

/// Settings for [`MaskinportenFetcher`](crate::fetch::MaskinportenFetcher).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaskinportenConfig {
	/// Endpoint receiving the JWT-bearer grant.
	pub token_url: Url,
	/// `aud` claim of every grant.
	pub audience: String,
	/// Registered client; becomes the `iss` claim.
	pub client_id: ClientId,
	/// Signing key id; becomes the `kid` header.
	pub key_id: KeyId,
	/// Standard-base64 encoding of the RSA private JWK.
	pub encoded_jwk: TokenSecret,
	/// Lifetime of each signed grant.
	pub assertion_lifetime: Duration,
	/// Per-call HTTP timeout.
	pub request_timeout: Duration,
}
impl MaskinportenConfig {
	/// Starts a builder targeting the test environment.
	pub fn builder(
		client_id: ClientId,
		key_id: KeyId,
		encoded_jwk: TokenSecret,
	) -> MaskinportenConfigBuilder {
		MaskinportenConfigBuilder::new(client_id, key_id, encoded_jwk)
	}

	/// Loads client id, key id and key material from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads settings through `lookup`, which maps a variable name to its value. All three
	/// variables are required.
	pub fn from_lookup<L>(mut lookup: L) -> Result<Self, ConfigError>
	where
		L: FnMut(&str) -> Option<String>,
	{
		let key_id = KeyId::new(required(&mut lookup, MASKINPORTEN_KEY_ID)?)?;
		let client_id = ClientId::new(required(&mut lookup, MASKINPORTEN_CLIENT_ID)?)?;
		let encoded_jwk = TokenSecret::new(required(&mut lookup, MASKINPORTEN_ENCODED_JWK)?);

		Self::builder(client_id, key_id, encoded_jwk).build()
	}
}

/// Builder for [`MaskinportenConfig`] values.
#[derive(Debug)]
pub struct MaskinportenConfigBuilder {
	/// Token endpoint override.
	pub token_url: Option<Url>,
	/// Audience override.
	pub audience: Option<String>,
	/// Registered client.
	pub client_id: ClientId,
	/// Signing key id.
	pub key_id: KeyId,
	/// Encoded private JWK.
	pub encoded_jwk: TokenSecret,
	/// Grant lifetime.
	pub assertion_lifetime: Duration,
	/// Per-call HTTP timeout.
	pub request_timeout: Duration,
}
impl MaskinportenConfigBuilder {
	/// Creates a builder for one client and signing key.
	pub fn new(client_id: ClientId, key_id: KeyId, encoded_jwk: TokenSecret) -> Self {
		Self {
			token_url: None,
			audience: None,
			client_id,
			key_id,
			encoded_jwk,
			assertion_lifetime: DEFAULT_ASSERTION_LIFETIME,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Sets the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Sets the `aud` claim.
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}

	/// Overrides the grant lifetime.
	pub fn assertion_lifetime(mut self, lifetime: Duration) -> Self {
		self.assertion_lifetime = lifetime;

		self
	}

	/// Overrides the per-call HTTP timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<MaskinportenConfig, ConfigError> {
		let audience = self.audience.unwrap_or_else(|| DEFAULT_MASKINPORTEN_AUDIENCE.into());

		if audience.trim().is_empty() {
			return Err(ConfigError::InvalidUrl { field: "audience", url: audience });
		}

		Ok(MaskinportenConfig {
			token_url: resolve_url("token_url", self.token_url, DEFAULT_MASKINPORTEN_TOKEN_URL)?,
			audience,
			client_id: self.client_id,
			key_id: self.key_id,
			encoded_jwk: self.encoded_jwk,
			assertion_lifetime: positive("assertion_lifetime", self.assertion_lifetime)?,
			request_timeout: positive("request_timeout", self.request_timeout)?,
		})
	}
}
