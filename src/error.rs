//! Crate-level error types shared across the cache, fetchers, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant aborts the current call; nothing is retried internally and the cache is
/// left untouched.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Request shape is invalid; never retried.
	#[error(transparent)]
	Validation(#[from] crate::request::ValidationError),
	/// Token endpoint answered with a non-success status.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// Token endpoint response could not be parsed.
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// Expiry could not be derived from the issued token.
	#[error(transparent)]
	ExpiryDecode(#[from] ExpiryDecodeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// HTTP status of a [`FetchError`], when this error carries one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Fetch(e) => Some(e.status),
			_ => None,
		}
	}
}

/// Non-success response returned by a token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Failed getting {variant} token: HTTP {status}: {body}.")]
pub struct FetchError {
	/// Label of the credential variant being fetched.
	pub variant: &'static str,
	/// HTTP status code.
	pub status: u16,
	/// Response body as returned by the endpoint.
	pub body: String,
}

/// Malformed token endpoint responses.
#[derive(Debug, ThisError)]
pub enum ParseError {
	/// Endpoint answered 200 without a token.
	#[error("Token endpoint returned an empty body.")]
	EmptyBody,
	/// JSON token response could not be decoded.
	#[error("Unable to parse token response at `{}`.", source.path())]
	TokenResponse {
		/// Structured parsing failure including the failing JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Bulk token payload is not a JSON object of strings.
	#[error("Unable to parse bulk token payload.")]
	BulkTokens {
		/// Underlying JSON failure.
		#[source]
		source: serde_json::Error,
	},
}

/// Failures while reading the `exp` claim of an issued token.
#[derive(Debug, ThisError)]
pub enum ExpiryDecodeError {
	/// Token is not a three-segment compact JWT.
	#[error("Token is not a compact JWT.")]
	NotCompactJwt,
	/// Payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Base64(#[from] base64::DecodeError),
	/// Payload segment is not a JSON claims object.
	#[error("Token payload is not a JSON claims object.")]
	Claims(#[from] serde_json::Error),
	/// Claims do not carry an `exp` value.
	#[error("Token claims are missing exp.")]
	MissingExp,
	/// The `exp` value cannot be represented as a timestamp.
	#[error("The exp claim {exp} is out of range.")]
	OutOfRange {
		/// Raw claim value.
		exp: i64,
	},
	/// Token expired before it could be cached.
	#[error("Received token is already expired (exp {expires_at}).")]
	AlreadyExpired {
		/// Decoded expiry instant.
		expires_at: OffsetDateTime,
	},
}

/// Configuration and validation failures raised while assembling fetchers.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is not set.
	#[error("Environment variable {name} is required.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Configured URL is invalid or not HTTP(S).
	#[error("The {field} URL is invalid: {url}.")]
	InvalidUrl {
		/// Which field failed validation.
		field: &'static str,
		/// Offending value.
		url: String,
	},
	/// Configured URL cannot be joined with an endpoint path.
	#[error("Unable to build the {endpoint} URL.")]
	EndpointJoin {
		/// Endpoint path that failed to join.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A duration setting must be positive.
	#[error("The {field} duration must be positive.")]
	NonPositiveDuration {
		/// Which field failed validation.
		field: &'static str,
	},
	/// Cached credential record could not be assembled.
	#[error("Unable to build cached credential.")]
	CredentialBuild(#[from] crate::auth::CachedCredentialBuilderError),
	/// Identifier setting failed validation.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Signing key material could not be decoded.
	#[error("Signing key material is unusable: {reason}.")]
	InvalidKeyMaterial {
		/// Human-readable reason.
		reason: String,
	},
	/// Assertion signing failed.
	#[error("Unable to sign the JWT-bearer assertion.")]
	Signing(#[from] jsonwebtoken::errors::Error),
	/// Fetcher does not serve the requested credential variant.
	#[error("The {fetcher} fetcher does not serve {variant} credentials.")]
	UnsupportedVariant {
		/// Fetcher label.
		fetcher: &'static str,
		/// Requested variant label.
		variant: &'static str,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn key_material(reason: impl Display) -> Self {
		Self::InvalidKeyMaterial { reason: reason.to_string() }
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for Error {
	fn from(e: ReqwestError) -> Self {
		TransportError::from(e).into()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::request::{CredentialVariant, ValidationError};

	#[test]
	fn fetch_error_exposes_status_and_body() {
		let err: Error =
			FetchError { variant: "personal", status: 401, body: "Unauthorized".into() }.into();

		assert_eq!(err.status(), Some(401));
		assert_eq!(err.to_string(), "Failed getting personal token: HTTP 401: Unauthorized.");
	}

	#[test]
	fn validation_error_converts_transparently() {
		let validation = ValidationError::UnknownOption {
			variant: CredentialVariant::Personal,
			key: "invalidkey".into(),
		};
		let err: Error = validation.clone().into();

		assert!(matches!(err, Error::Validation(_)));
		assert_eq!(err.to_string(), validation.to_string());
		assert_eq!(err.status(), None);
	}

	#[test]
	fn token_response_parse_reports_json_path() {
		#[derive(Debug, Deserialize)]
		struct Body {
			#[allow(dead_code)]
			access_token: String,
		}

		let de = &mut serde_json::Deserializer::from_str("{\"access_token\":42}");
		let source = serde_path_to_error::deserialize::<_, Body>(de)
			.expect_err("Numeric access_token must fail to deserialize.");
		let err = ParseError::TokenResponse { source };

		assert!(err.to_string().contains("access_token"));
	}
}
