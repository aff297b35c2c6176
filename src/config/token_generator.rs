// self
use super::{DEFAULT_REQUEST_TIMEOUT, positive, required, resolve_url};
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Base URL of the hosted test token generator.
pub const DEFAULT_TOKEN_GENERATOR_URL: &str =
	"https://altinn-testtools-token-generator.azurewebsites.net/api/";
/// Environment requested when the caller does not set `env`.
pub const DEFAULT_TOKEN_ENV: &str = "yt01";
/// Token lifetime assumed (and requested) when neither the caller nor `TTL` sets one.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::HOUR;

/// Variable holding the Basic-auth username.
pub const TOKEN_GENERATOR_USERNAME: &str = "TOKEN_GENERATOR_USERNAME";
/// Variable holding the Basic-auth password.
pub const TOKEN_GENERATOR_PASSWORD: &str = "TOKEN_GENERATOR_PASSWORD";
/// Variable overriding the default token lifetime, in seconds.
pub const TOKEN_TTL: &str = "TTL";

/// Settings for [`TokenGeneratorFetcher`](crate::fetch::TokenGeneratorFetcher).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenGeneratorConfig {
	/// Base URL every endpoint path is joined onto; always ends with `/`.
	pub base_url: Url,
	/// Basic-auth username.
	pub username: String,
	/// Basic-auth password.
	pub password: TokenSecret,
	/// `env` sent when the request does not carry one.
	pub default_env: String,
	/// `ttl` sent, and used for freshness, when the request does not carry one.
	pub default_ttl: Duration,
	/// Per-call HTTP timeout.
	pub request_timeout: Duration,
}
impl TokenGeneratorConfig {
	/// Starts a builder seeded with the hosted generator's defaults.
	pub fn builder(
		username: impl Into<String>,
		password: impl Into<String>,
	) -> TokenGeneratorConfigBuilder {
		TokenGeneratorConfigBuilder::new(username, password)
	}

	/// Loads credentials and TTL from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads settings through `lookup`, which maps a variable name to its value.
	///
	/// Username and password are required. A `TTL` that is not a positive integer falls back
	/// to [`DEFAULT_TOKEN_TTL`].
	pub fn from_lookup<L>(mut lookup: L) -> Result<Self, ConfigError>
	where
		L: FnMut(&str) -> Option<String>,
	{
		let username = required(&mut lookup, TOKEN_GENERATOR_USERNAME)?;
		let password = required(&mut lookup, TOKEN_GENERATOR_PASSWORD)?;
		let ttl = lookup(TOKEN_TTL)
			.and_then(|raw| raw.trim().parse::<i64>().ok())
			.filter(|secs| *secs > 0)
			.map(Duration::seconds)
			.unwrap_or(DEFAULT_TOKEN_TTL);

		Self::builder(username, password).default_ttl(ttl).build()
	}

	/// Joins `endpoint` onto the base URL.
	pub fn endpoint_url(&self, endpoint: &'static str) -> Result<Url, ConfigError> {
		self.base_url.join(endpoint).map_err(|source| ConfigError::EndpointJoin { endpoint, source })
	}
}

/// Builder for [`TokenGeneratorConfig`] values.
#[derive(Debug)]
pub struct TokenGeneratorConfigBuilder {
	/// Base URL override; the hosted generator when unset.
	pub base_url: Option<Url>,
	/// Basic-auth username.
	pub username: String,
	/// Basic-auth password.
	pub password: TokenSecret,
	/// Default `env` option.
	pub default_env: String,
	/// Default token lifetime.
	pub default_ttl: Duration,
	/// Per-call HTTP timeout.
	pub request_timeout: Duration,
}
impl TokenGeneratorConfigBuilder {
	/// Creates a builder for the given Basic-auth credentials.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			base_url: None,
			username: username.into(),
			password: TokenSecret::new(password),
			default_env: DEFAULT_TOKEN_ENV.into(),
			default_ttl: DEFAULT_TOKEN_TTL,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Points the fetcher at another generator deployment.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the default `env` option.
	pub fn default_env(mut self, env: impl Into<String>) -> Self {
		self.default_env = env.into();

		self
	}

	/// Overrides the default token lifetime.
	pub fn default_ttl(mut self, ttl: Duration) -> Self {
		self.default_ttl = ttl;

		self
	}

	/// Overrides the per-call HTTP timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<TokenGeneratorConfig, ConfigError> {
		let mut base_url = resolve_url("base_url", self.base_url, DEFAULT_TOKEN_GENERATOR_URL)?;

		// `Url::join` replaces the last segment unless the path ends with a slash.
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		Ok(TokenGeneratorConfig {
			base_url,
			username: self.username,
			password: self.password,
			default_env: self.default_env,
			default_ttl: positive("default_ttl", self.default_ttl)?,
			request_timeout: positive("request_timeout", self.request_timeout)?,
		})
	}
}
