// crates.io
use proptest::{prelude::*, sample::Index};
// self
use credential_broker::request::{
	CredentialRequest, CredentialVariant, ValidationError, validate_options,
};

fn variant() -> impl Strategy<Value = CredentialVariant> {
	prop::sample::select(CredentialVariant::ALL.to_vec())
}

proptest! {
	#[test]
	fn allow_listed_options_always_build(
		variant in variant(),
		picks in prop::collection::vec(any::<Index>(), 0..8),
		value in "\\S{1,12}",
		ttl in 1_u32..=86_400,
	) {
		let allowed = variant.allowed_options();
		let options = picks.iter().map(|pick| {
			let key = *pick.get(allowed);
			let value = if key == "ttl" { ttl.to_string() } else { value.clone() };

			(key, value)
		});

		prop_assert!(CredentialRequest::new(variant, options).is_ok());
	}

	#[test]
	fn unknown_option_is_rejected_by_name(variant in variant(), key in "[A-Za-z]{1,16}") {
		prop_assume!(!variant.allows(&key));

		let known = variant.allowed_options()[0];
		let err = CredentialRequest::new(variant, [(known, "1"), (key.as_str(), "1")])
			.expect_err("Unknown option must be rejected.");

		prop_assert_eq!(&err, &ValidationError::UnknownOption { variant, key: key.clone() });
		let quoted_key = format!("\"{key}\"");
		prop_assert!(err.to_string().contains(&quoted_key));
	}
}

#[test]
fn first_unknown_key_is_reported() {
	let err = validate_options(CredentialVariant::Personal, ["env", "invalidkey", "orgNo"])
		.expect_err("Unknown keys must be rejected.");

	assert_eq!(err.to_string(), "TokenGeneratorOptions: \"invalidkey\" is not a valid option");
}

#[test]
fn allow_lists_do_not_leak_between_variants() {
	assert!(CredentialRequest::enterprise([("orgNo", "991825827")]).is_ok());
	assert!(CredentialRequest::personal([("orgNo", "991825827")]).is_err());
	assert!(CredentialRequest::platform([("app", "ttd/app"), ("env", "at22")]).is_ok());
	assert!(CredentialRequest::new(CredentialVariant::Maskinporten, [("env", "yt01")]).is_err());
}

#[test]
fn access_management_request_carries_portal_scope() {
	let request = CredentialRequest::access_management("5e5c0a1b-party", "20001234")
		.expect("Access-management request should be valid.");

	assert_eq!(request.variant(), CredentialVariant::Personal);
	assert_eq!(request.get("scopes"), Some("altinn:portal/enduser"));
	assert_eq!(request.get("userId"), Some("20001234"));
	assert_eq!(request.get("partyuuid"), Some("5e5c0a1b-party"));
}

#[test]
fn ttl_must_be_whole_positive_seconds() {
	assert_eq!(
		CredentialRequest::personal([("ttl", "3600s")]),
		Err(ValidationError::InvalidTtl { value: "3600s".into() })
	);
	assert!(CredentialRequest::platform([("ttl", "-5")]).is_err());
	assert!(CredentialRequest::enterprise([("ttl", "600")]).is_ok());
}
