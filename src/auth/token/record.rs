//! Cached credential records, freshness checks, and builders.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Errors produced by [`CachedCredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CachedCredentialBuilderError {
	/// Issued when no token value was provided.
	#[error("Token is required.")]
	MissingToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// Credential plus the instants that govern its reuse.
///
/// Records are immutable; a refetch replaces the whole record.
#[derive(Clone, Serialize, Deserialize)]
pub struct CachedCredential {
	/// Bearer token; callers must avoid logging it.
	pub token: TokenSecret,
	/// Instant the fetch that produced the credential was sent.
	pub issued_at: OffsetDateTime,
	/// Instant after which the credential is no longer accepted.
	pub expires_at: OffsetDateTime,
}
impl CachedCredential {
	/// Returns a builder for constructing records.
	pub fn builder() -> CachedCredentialBuilder {
		CachedCredentialBuilder::default()
	}

	/// Returns `true` when the credential can be reused at `instant` without risking
	/// expiry mid-flight, i.e. `instant < expires_at - margin`.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, margin: Duration) -> bool {
		instant < self.expires_at - margin
	}
}
impl Debug for CachedCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedCredential")
			.field("token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`CachedCredential`].
#[derive(Clone, Debug, Default)]
pub struct CachedCredentialBuilder {
	token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CachedCredentialBuilder {
	/// Provides the token value.
	pub fn token(mut self, token: TokenSecret) -> Self {
		self.token = Some(token);

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`CachedCredential`].
	pub fn build(self) -> Result<CachedCredential, CachedCredentialBuilderError> {
		let token = self.token.ok_or(CachedCredentialBuilderError::MissingToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(CachedCredentialBuilderError::MissingExpiry),
		};

		Ok(CachedCredential { token, issued_at, expires_at })
	}
}
