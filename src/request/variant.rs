// self
use crate::_prelude::*;

const PERSONAL_OPTIONS: &[&str] = &[
	"env",
	"scopes",
	"userId",
	"partyId",
	"pid",
	"bulkCount",
	"authLvl",
	"consumerOrgNo",
	"partyuuid",
	"userName",
	"clientAmr",
	"ttl",
	"delegationSource",
];
const ENTERPRISE_OPTIONS: &[&str] = &[
	"env",
	"scopes",
	"org",
	"orgName",
	"orgNo",
	"supplierOrgNo",
	"partyId",
	"userId",
	"partyuuid",
	"userName",
	"ttl",
	"delegationSource",
];
const PLATFORM_OPTIONS: &[&str] = &["env", "app", "ttl"];
const MASKINPORTEN_OPTIONS: &[&str] = &["scopes"];

/// Credential variants, each with its own immutable option allow-list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialVariant {
	/// End-user token minted by the token generator.
	Personal,
	/// Organisation token minted by the token generator.
	Enterprise,
	/// Platform (app-to-platform) token minted by the token generator.
	Platform,
	/// Access token exchanged for a signed JWT-bearer assertion.
	Maskinporten,
}
impl CredentialVariant {
	/// Every variant, in declaration order.
	pub const ALL: [Self; 4] = [Self::Personal, Self::Enterprise, Self::Platform, Self::Maskinporten];

	/// Returns a stable label suitable for cache keys, span fields, and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Personal => "personal",
			Self::Enterprise => "enterprise",
			Self::Platform => "platform",
			Self::Maskinporten => "maskinporten",
		}
	}

	/// Option names accepted for this variant.
	pub const fn allowed_options(self) -> &'static [&'static str] {
		match self {
			Self::Personal => PERSONAL_OPTIONS,
			Self::Enterprise => ENTERPRISE_OPTIONS,
			Self::Platform => PLATFORM_OPTIONS,
			Self::Maskinporten => MASKINPORTEN_OPTIONS,
		}
	}

	/// Returns `true` if `key` is on this variant's allow-list. Matching is case-sensitive.
	pub fn allows(self, key: &str) -> bool {
		self.allowed_options().contains(&key)
	}

	/// Token generator endpoint serving this variant, if any.
	pub const fn token_generator_endpoint(self) -> Option<&'static str> {
		match self {
			Self::Personal => Some("GetPersonalToken"),
			Self::Enterprise => Some("GetEnterpriseToken"),
			Self::Platform => Some("GetPlatformToken"),
			Self::Maskinporten => None,
		}
	}
}
impl Display for CredentialVariant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn allow_lists_are_distinct_per_variant() {
		assert!(CredentialVariant::Personal.allows("pid"));
		assert!(!CredentialVariant::Enterprise.allows("pid"));
		assert!(CredentialVariant::Enterprise.allows("orgNo"));
		assert!(!CredentialVariant::Personal.allows("orgNo"));
		assert!(CredentialVariant::Platform.allows("app"));
		assert_eq!(CredentialVariant::Maskinporten.allowed_options(), ["scopes"]);
		assert!(!CredentialVariant::Personal.allows("userid"), "Matching is case-sensitive.");
	}

	#[test]
	fn only_token_generator_variants_have_endpoints() {
		for variant in CredentialVariant::ALL {
			assert_eq!(
				variant.token_generator_endpoint().is_none(),
				variant == CredentialVariant::Maskinporten
			);
		}
	}
}
