//! Exchanges a signed JWT-bearer grant against a mocked token endpoint and caches the access
//! token until its `exp` claim.

// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use credential_broker::{
	auth::{ClientId, KeyId, TokenSecret},
	cache::CredentialCache,
	config::MaskinportenConfig,
	fetch::MaskinportenFetcher,
	request::CredentialRequest,
	url::Url,
};

const JWK: &str = include_str!("../tests/fixtures/signing_jwk.json");

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let exp = (OffsetDateTime::now_utc() + Duration::minutes(2)).unix_timestamp();
	let access_token = format!(
		"eyJhbGciOiJSUzI1NiJ9.{}.c2lnbmF0dXJl",
		URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"))
	);
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("assertion=ey");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"access_token\":\"{access_token}\",\"expires_in\":119}}"));
		})
		.await;
	let config = MaskinportenConfig::builder(
		ClientId::new("demo-client")?,
		KeyId::new("demo-signing-key")?,
		TokenSecret::new(STANDARD.encode(JWK)),
	)
	.token_url(Url::parse(&server.url("/token"))?)
	.build()?;
	let cache = CredentialCache::<MaskinportenFetcher>::new(MaskinportenFetcher::new(config)?);
	let record = cache.get(&CredentialRequest::maskinporten("digdir:dialogporten")?).await?;

	println!("Access token cached until {}.", record.expires_at);

	token_mock.assert_async().await;

	Ok(())
}
