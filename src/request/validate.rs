// self
use crate::{
	_prelude::*,
	auth::ScopeValidationError,
	request::CredentialVariant,
};

/// Errors raised while validating credential request options.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Option name is not on the variant's allow-list.
	#[error("TokenGeneratorOptions: \"{key}\" is not a valid option")]
	UnknownOption {
		/// Variant whose allow-list rejected the key.
		variant: CredentialVariant,
		/// Offending option name.
		key: String,
	},
	/// Option was supplied with an empty value.
	#[error("TokenGeneratorOptions: \"{key}\" cannot be empty")]
	EmptyValue {
		/// Option name.
		key: String,
	},
	/// The `scopes` option is not a valid scope list.
	#[error("TokenGeneratorOptions: \"scopes\" is invalid: {0}")]
	InvalidScopes(#[from] ScopeValidationError),
	/// The `ttl` option is not a positive number of seconds.
	#[error("TokenGeneratorOptions: \"ttl\" must be a positive number of seconds, got {value}")]
	InvalidTtl {
		/// Rejected value.
		value: String,
	},
	/// A fetcher requires an option the request does not carry.
	#[error("{variant} requests require the \"{key}\" option")]
	MissingOption {
		/// Variant of the incomplete request.
		variant: CredentialVariant,
		/// Required option name.
		key: &'static str,
	},
}

/// Checks every key against the variant's allow-list, failing on the first unknown key.
///
/// The check is pure and all-or-nothing: nothing is built or sent unless every key passes.
pub fn validate_options<'a, I>(variant: CredentialVariant, keys: I) -> Result<(), ValidationError>
where
	I: IntoIterator<Item = &'a str>,
{
	match keys.into_iter().find(|key| !variant.allows(key)) {
		Some(key) => Err(ValidationError::UnknownOption { variant, key: key.to_owned() }),
		None => Ok(()),
	}
}
