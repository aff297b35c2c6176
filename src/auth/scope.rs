//! Scope modeling helpers shared by token requests and JWT-bearer assertions.

// std
use std::collections::BTreeSet;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Scope lists cannot be empty or whitespace-only.
	#[error("Scope list cannot be empty.")]
	Empty,
	/// Individual scopes cannot contain whitespace.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized, non-empty set of scopes.
///
/// Scopes are deduplicated and sorted, so `"b a"` and `"a b a"` compare equal and render the
/// same space-delimited string. The wire form (query parameter, `scope` claim) is that string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut set = BTreeSet::new();

		for scope in scopes {
			let owned: String = scope.into();

			if owned.is_empty() {
				return Err(ScopeValidationError::Empty);
			}
			if owned.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
			}

			set.insert(owned);
		}

		if set.is_empty() {
			return Err(ScopeValidationError::Empty);
		}

		Ok(Self(Arc::from(set.into_iter().collect::<Vec<_>>())))
	}

	/// Returns the normalized, space-delimited representation.
	pub fn normalized(&self) -> String {
		self.0.join(" ")
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.normalized())
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(DeError::custom)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scopes_normalize_order_and_duplicates() {
		let lhs = ScopeSet::from_str("digdir:dialogporten  altinn:portal/enduser digdir:dialogporten")
			.expect("Left-hand scope set should be valid.");
		let rhs = ScopeSet::new(["altinn:portal/enduser", "digdir:dialogporten"])
			.expect("Right-hand scope set should be valid.");

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.normalized(), "altinn:portal/enduser digdir:dialogporten");
		assert_eq!(lhs.to_string(), rhs.normalized());
	}

	#[test]
	fn empty_and_padded_scopes_are_rejected() {
		assert_eq!(ScopeSet::from_str(""), Err(ScopeValidationError::Empty));
		assert_eq!(ScopeSet::from_str("   "), Err(ScopeValidationError::Empty));
		assert!(matches!(
			ScopeSet::new(["a:b c"]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
	}

	#[test]
	fn serde_uses_space_delimited_string() {
		let scopes = ScopeSet::from_str("b:write a:read").expect("Scope fixture should parse.");
		let payload = serde_json::to_string(&scopes).expect("Scopes should serialize.");

		assert_eq!(payload, "\"a:read b:write\"");

		let back: ScopeSet = serde_json::from_str(&payload).expect("Scopes should deserialize.");

		assert_eq!(back, scopes);
	}
}
