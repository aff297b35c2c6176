//! Signed JWT-bearer grants (RFC 7523) built from a base64-encoded RSA JSON Web Key.

// crates.io
use base64::{
	Engine as _,
	alphabet,
	engine::{
		DecodePaddingMode, GeneralPurpose,
		general_purpose::{PAD, URL_SAFE_NO_PAD},
	},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::{BigUint, RsaPrivateKey, pkcs1::EncodeRsaPrivateKey};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, KeyId, ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Grant type sent alongside the signed assertion.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

// Key blobs are produced by several tools; accept them with or without padding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims carried by a JWT-bearer grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantClaims {
	/// Token endpoint audience.
	pub aud: String,
	/// Space-delimited scopes requested.
	pub scope: ScopeSet,
	/// Issuing client.
	pub iss: String,
	/// Issued-at, seconds since the epoch.
	pub iat: i64,
	/// Expiry, seconds since the epoch.
	pub exp: i64,
	/// Unique grant identifier preventing replay.
	pub jti: String,
}

#[derive(Deserialize)]
struct RsaJwk {
	kty: String,
	n: String,
	e: String,
	d: String,
	p: Option<String>,
	q: Option<String>,
}

/// Signs JWT-bearer grants for one client and key.
#[derive(Clone)]
pub struct AssertionSigner {
	client_id: ClientId,
	key_id: KeyId,
	audience: String,
	lifetime: Duration,
	key: EncodingKey,
}
impl AssertionSigner {
	/// Decodes `encoded_jwk` (standard base64 of an RSA private JWK) into an RS256 signing key.
	pub fn new(
		client_id: ClientId,
		key_id: KeyId,
		audience: impl Into<String>,
		encoded_jwk: &TokenSecret,
		lifetime: Duration,
	) -> Result<Self, ConfigError> {
		if !lifetime.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "assertion_lifetime" });
		}

		let key = decode_rsa_jwk(encoded_jwk.expose())?;

		Ok(Self { client_id, key_id, audience: audience.into(), lifetime, key })
	}

	/// Builds the claims of a grant issued at `now`.
	pub fn claims(&self, scope: &ScopeSet, now: OffsetDateTime) -> GrantClaims {
		let iat = now.unix_timestamp();

		GrantClaims {
			aud: self.audience.clone(),
			scope: scope.clone(),
			iss: self.client_id.to_string(),
			iat,
			exp: iat + self.lifetime.whole_seconds(),
			jti: URL_SAFE_NO_PAD.encode(rand::random::<[u8; 16]>()),
		}
	}

	/// Signs a compact RS256 grant for `scope`, issued at `now`.
	pub fn sign(&self, scope: &ScopeSet, now: OffsetDateTime) -> Result<String, ConfigError> {
		let mut header = Header::new(Algorithm::RS256);

		header.kid = Some(self.key_id.to_string());

		Ok(jsonwebtoken::encode(&header, &self.claims(scope, now), &self.key)?)
	}
}
impl Debug for AssertionSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AssertionSigner")
			.field("client_id", &self.client_id)
			.field("key_id", &self.key_id)
			.field("audience", &self.audience)
			.field("lifetime", &self.lifetime)
			.field("key", &"<redacted>")
			.finish()
	}
}

fn decode_rsa_jwk(encoded: &str) -> Result<EncodingKey, ConfigError> {
	let json = LENIENT_STANDARD.decode(encoded.trim()).map_err(ConfigError::key_material)?;
	let jwk: RsaJwk = serde_json::from_slice(&json).map_err(ConfigError::key_material)?;

	if jwk.kty != "RSA" {
		return Err(ConfigError::key_material(format!("expected an RSA key, got kty {}", jwk.kty)));
	}

	let (Some(p), Some(q)) = (jwk.p.as_deref(), jwk.q.as_deref()) else {
		return Err(ConfigError::key_material("the JWK is missing its prime factors"));
	};
	let key = RsaPrivateKey::from_components(
		jwk_uint("n", &jwk.n)?,
		jwk_uint("e", &jwk.e)?,
		jwk_uint("d", &jwk.d)?,
		vec![jwk_uint("p", p)?, jwk_uint("q", q)?],
	)
	.map_err(ConfigError::key_material)?;
	let der = key.to_pkcs1_der().map_err(ConfigError::key_material)?;

	Ok(EncodingKey::from_rsa_der(der.as_bytes()))
}

fn jwk_uint(member: &str, value: &str) -> Result<BigUint, ConfigError> {
	let bytes = URL_SAFE_NO_PAD
		.decode(value)
		.map_err(|e| ConfigError::key_material(format!("JWK member {member}: {e}")))?;

	Ok(BigUint::from_bytes_be(&bytes))
}
