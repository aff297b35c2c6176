//! Validated credential requests and the canonical cache keys derived from them.
//!
//! A [`CredentialRequest`] can only be built from option names on its variant's allow-list,
//! so a typo fails before any network activity. Options live in a sorted map, which makes
//! [`CacheKey`] independent of the order callers supplied them in.

mod validate;
mod variant;

pub use validate::*;
pub use variant::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::ScopeSet};

const SCOPES: &str = "scopes";
const TTL: &str = "ttl";
const ENV: &str = "env";
const ACCESS_MANAGEMENT_SCOPE: &str = "altinn:portal/enduser";

/// Validated option set for one credential variant.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CredentialRequest {
	variant: CredentialVariant,
	options: BTreeMap<String, String>,
}
impl CredentialRequest {
	/// Validates `options` against the variant's allow-list and builds the request.
	///
	/// Later duplicates of the same key replace earlier ones. `scopes` values are normalized
	/// (sorted, deduplicated) and `ttl` must be a positive number of seconds.
	pub fn new<I, K, V>(variant: CredentialVariant, options: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let pairs = options
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect::<Vec<(String, String)>>();

		validate_options(variant, pairs.iter().map(|(key, _)| key.as_str()))?;

		let mut request = Self { variant, options: BTreeMap::new() };

		for (key, value) in pairs {
			request.insert_checked(key, value)?;
		}

		Ok(request)
	}

	/// Personal token request.
	pub fn personal<I, K, V>(options: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self::new(CredentialVariant::Personal, options)
	}

	/// Enterprise token request.
	pub fn enterprise<I, K, V>(options: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self::new(CredentialVariant::Enterprise, options)
	}

	/// Platform token request.
	pub fn platform<I, K, V>(options: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self::new(CredentialVariant::Platform, options)
	}

	/// JWT-bearer access token request for a space-separated scope list.
	pub fn maskinporten(scopes: impl Into<String>) -> Result<Self, ValidationError> {
		Self::new(CredentialVariant::Maskinporten, [(SCOPES, scopes.into())])
	}

	/// Personal token acting for `party_uuid`, as used by access-management scenarios.
	pub fn access_management(
		party_uuid: impl Into<String>,
		user_id: impl Into<String>,
	) -> Result<Self, ValidationError> {
		Self::personal([
			(SCOPES, ACCESS_MANAGEMENT_SCOPE.to_owned()),
			("userId", user_id.into()),
			("partyuuid", party_uuid.into()),
		])
	}

	/// Adds or replaces one option after validating it.
	pub fn with_option(
		mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let key = key.into();

		validate_options(self.variant, [key.as_str()])?;
		self.insert_checked(key, value.into())?;

		Ok(self)
	}

	/// Fills `env` and `ttl` when the variant accepts them and the caller left them unset.
	pub fn with_defaults(mut self, env: &str, ttl: Duration) -> Self {
		if self.variant.allows(ENV) && !env.is_empty() {
			self.options.entry(ENV.into()).or_insert_with(|| env.to_owned());
		}
		if self.variant.allows(TTL) && ttl.is_positive() {
			self.options.entry(TTL.into()).or_insert_with(|| ttl.whole_seconds().to_string());
		}

		self
	}

	/// Credential variant of this request.
	pub fn variant(&self) -> CredentialVariant {
		self.variant
	}

	/// Value of one option, if set.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.options.get(key).map(String::as_str)
	}

	/// Options in canonical (sorted by name) order.
	pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
		self.options.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Parsed `scopes` option, if set.
	pub fn scopes(&self) -> Option<ScopeSet> {
		self.get(SCOPES).and_then(|raw| raw.parse().ok())
	}

	/// Parsed `ttl` option, if set.
	pub fn ttl(&self) -> Option<Duration> {
		self.get(TTL).and_then(parse_ttl)
	}

	/// Canonical cache key for this request.
	pub fn cache_key(&self) -> CacheKey {
		CacheKey::new(self.variant, &self.options)
	}

	fn insert_checked(&mut self, key: String, value: String) -> Result<(), ValidationError> {
		if value.trim().is_empty() {
			return Err(ValidationError::EmptyValue { key });
		}

		let value = match key.as_str() {
			SCOPES => value.parse::<ScopeSet>()?.normalized(),
			TTL => {
				if parse_ttl(&value).is_none() {
					return Err(ValidationError::InvalidTtl { value });
				}

				value.trim().to_owned()
			},
			_ => value,
		};

		self.options.insert(key, value);

		Ok(())
	}
}
impl Debug for CredentialRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		// Option values can carry personal identifiers (pid, userId); only names are shown.
		f.debug_struct("CredentialRequest")
			.field("variant", &self.variant)
			.field("options", &self.options.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Canonical, order-independent key identifying a cached credential.
///
/// Rendered as `<variant>|<form-encoded sorted options>`, so two requests with the same
/// variant and options always share a key regardless of construction order.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	fn new(variant: CredentialVariant, options: &BTreeMap<String, String>) -> Self {
		let encoded = form_urlencoded::Serializer::new(String::new()).extend_pairs(options).finish();

		Self(format!("{}|{encoded}", variant.as_str()))
	}

	/// Raw key string. Contains option values; prefer [`fingerprint`](Self::fingerprint) in logs.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Base64 (no padding) SHA-256 digest of the key, safe to log.
	pub fn fingerprint(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.0.as_bytes());

		STANDARD_NO_PAD.encode(hasher.finalize())
	}
}
impl Debug for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("CacheKey").field(&self.fingerprint()).finish()
	}
}

fn parse_ttl(raw: &str) -> Option<Duration> {
	raw.trim().parse::<i64>().ok().filter(|secs| *secs > 0).map(Duration::seconds)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn cache_key_ignores_option_and_scope_order() {
		let lhs = CredentialRequest::personal([("env", "yt01"), ("scopes", "b:2 a:1"), ("pid", "1")])
			.expect("Left-hand request should be valid.");
		let rhs = CredentialRequest::personal([("pid", "1"), ("scopes", "a:1 b:2"), ("env", "yt01")])
			.expect("Right-hand request should be valid.");

		assert_eq!(lhs.cache_key(), rhs.cache_key());
		assert_eq!(lhs.cache_key().as_str(), "personal|env=yt01&pid=1&scopes=a%3A1+b%3A2");
		assert_eq!(lhs.cache_key().fingerprint(), rhs.cache_key().fingerprint());
	}

	#[test]
	fn cache_key_separates_variants_and_values() {
		let personal = CredentialRequest::personal([("env", "yt01")]).expect("Valid request.");
		let enterprise = CredentialRequest::enterprise([("env", "yt01")]).expect("Valid request.");
		let smuggled = CredentialRequest::enterprise([("env", "yt01&org=digdir")])
			.expect("Values are opaque to validation.");
		let split = CredentialRequest::enterprise([("env", "yt01"), ("org", "digdir")])
			.expect("Valid request.");

		assert_ne!(personal.cache_key(), enterprise.cache_key());
		assert_ne!(smuggled.cache_key(), split.cache_key());
	}

	#[test]
	fn defaults_fill_only_missing_allowed_options() {
		let request = CredentialRequest::personal([("env", "tt02")])
			.expect("Valid request.")
			.with_defaults("yt01", Duration::hours(1));

		assert_eq!(request.get("env"), Some("tt02"));
		assert_eq!(request.ttl(), Some(Duration::hours(1)));

		let maskinporten = CredentialRequest::maskinporten("a:b")
			.expect("Valid request.")
			.with_defaults("yt01", Duration::hours(1));

		assert_eq!(maskinporten.options().count(), 1);
	}

	#[test]
	fn values_are_checked() {
		assert_eq!(
			CredentialRequest::personal([("env", " ")]),
			Err(ValidationError::EmptyValue { key: "env".into() })
		);
		assert_eq!(
			CredentialRequest::personal([("ttl", "soon")]),
			Err(ValidationError::InvalidTtl { value: "soon".into() })
		);
		assert!(matches!(
			CredentialRequest::personal([("ttl", "0")]),
			Err(ValidationError::InvalidTtl { .. })
		));
		assert!(
			CredentialRequest::maskinporten("a:b")
				.expect("Maskinporten request should be valid.")
				.with_option("env", "yt01")
				.is_err()
		);
	}

	#[test]
	fn access_management_request_binds_party() {
		let request = CredentialRequest::access_management("6b0c2f4e", "20012345")
			.expect("Access-management request should be valid.");

		assert_eq!(request.variant(), CredentialVariant::Personal);
		assert_eq!(request.get("scopes"), Some(ACCESS_MANAGEMENT_SCOPE));
		assert_eq!(request.get("partyuuid"), Some("6b0c2f4e"));
		assert_eq!(request.get("userId"), Some("20012345"));
	}

	#[test]
	fn debug_hides_option_values() {
		let request = CredentialRequest::personal([("pid", "08844397713")]).expect("Valid.");
		let rendered = format!("{request:?} {:?}", request.cache_key());

		assert!(!rendered.contains("08844397713"));
		assert!(rendered.contains("pid"));
	}
}
