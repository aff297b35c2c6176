//! Unverified JWT claim decoding used to derive cache expiry from issued tokens.
//!
//! Signature verification is the resource server's job; the cache only needs `exp` to know
//! when to stop reusing a token.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, error::ExpiryDecodeError};

#[derive(Deserialize)]
struct ExpiryClaims {
	exp: Option<serde_json::Number>,
}

/// Decodes the `exp` claim of a compact JWT without verifying its signature.
pub fn decode_expiry(token: &str) -> Result<OffsetDateTime, ExpiryDecodeError> {
	let mut segments = token.split('.');
	let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
		(Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
		_ => return Err(ExpiryDecodeError::NotCompactJwt),
	};
	// Some issuers pad their segments even though RFC 7515 forbids it.
	let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
	let claims: ExpiryClaims = serde_json::from_slice(&bytes)?;
	let exp = claims.exp.ok_or(ExpiryDecodeError::MissingExp)?;
	let seconds = exp
		.as_i64()
		.or_else(|| exp.as_f64().filter(|v| v.is_finite()).map(|v| v.floor() as i64))
		.ok_or(ExpiryDecodeError::MissingExp)?;

	OffsetDateTime::from_unix_timestamp(seconds)
		.map_err(|_| ExpiryDecodeError::OutOfRange { exp: seconds })
}

/// Decodes `exp` and rejects tokens that are already expired at `now`.
pub fn decode_live_expiry(
	token: &str,
	now: OffsetDateTime,
) -> Result<OffsetDateTime, ExpiryDecodeError> {
	let expires_at = decode_expiry(token)?;

	if expires_at <= now {
		return Err(ExpiryDecodeError::AlreadyExpired { expires_at });
	}

	Ok(expires_at)
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn jwt_with_payload(payload: &str) -> String {
		format!(
			"{}.{}.c2lnbmF0dXJl",
			URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
			URL_SAFE_NO_PAD.encode(payload)
		)
	}

	#[test]
	fn decodes_integer_and_fractional_exp() {
		let token = jwt_with_payload(r#"{"scope":"a:b","exp":1740830400}"#);

		assert_eq!(
			decode_expiry(&token).expect("Integer exp should decode."),
			macros::datetime!(2025-03-01 12:00 UTC)
		);

		let token = jwt_with_payload(r#"{"exp":1740830400.75}"#);

		assert_eq!(
			decode_expiry(&token).expect("Fractional exp should decode."),
			macros::datetime!(2025-03-01 12:00 UTC)
		);
	}

	#[test]
	fn malformed_tokens_are_classified() {
		assert!(matches!(decode_expiry("opaque-token"), Err(ExpiryDecodeError::NotCompactJwt)));
		assert!(matches!(decode_expiry("a..c"), Err(ExpiryDecodeError::NotCompactJwt)));
		assert!(matches!(decode_expiry("a.b.c.d"), Err(ExpiryDecodeError::NotCompactJwt)));
		assert!(matches!(decode_expiry("a.!!!.c"), Err(ExpiryDecodeError::Base64(_))));
		assert!(matches!(
			decode_expiry(&jwt_with_payload("not json")),
			Err(ExpiryDecodeError::Claims(_))
		));
		assert!(matches!(
			decode_expiry(&jwt_with_payload(r#"{"iss":"x"}"#)),
			Err(ExpiryDecodeError::MissingExp)
		));
		assert!(matches!(
			decode_expiry(&jwt_with_payload(r#"{"exp":9223372036854775807}"#)),
			Err(ExpiryDecodeError::OutOfRange { .. })
		));
	}

	#[test]
	fn padded_payload_segments_are_accepted() {
		let padded = format!(
			"e30.{}.sig",
			base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp": 1740830400}"#)
		);

		assert!(padded.contains('='));
		assert!(decode_expiry(&padded).is_ok());
	}

	#[test]
	fn live_expiry_rejects_expired_tokens() {
		let token = jwt_with_payload(r#"{"exp":1740830400}"#);
		let now = macros::datetime!(2025-03-01 12:00 UTC);

		assert!(matches!(
			decode_live_expiry(&token, now),
			Err(ExpiryDecodeError::AlreadyExpired { .. })
		));
		assert!(decode_live_expiry(&token, now - Duration::SECOND).is_ok());
	}
}
