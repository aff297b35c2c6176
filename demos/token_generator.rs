//! Fetches a personal token from a mocked token generator and shows the second lookup being
//! served from the cache.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use credential_broker::{
	cache::CredentialCache,
	config::TokenGeneratorConfig,
	fetch::TokenGeneratorFetcher,
	request::CredentialRequest,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/GetPersonalToken")
				.query_param("env", "yt01")
				.query_param("scopes", "digdir:dialogporten");
			then.status(200).body("demo-personal-token");
		})
		.await;
	let config = TokenGeneratorConfig::builder("demo-user", "demo-pass")
		.base_url(Url::parse(&server.base_url())?)
		.build()?;
	let cache = CredentialCache::<TokenGeneratorFetcher>::new(TokenGeneratorFetcher::new(config)?);
	let request =
		CredentialRequest::personal([("scopes", "digdir:dialogporten"), ("pid", "01017012345")])?;
	let first = cache.get(&request).await?;
	let second = cache.get(&request).await?;

	println!(
		"Cached personal token valid until {} (reused: {}).",
		first.expires_at,
		first.token == second.token
	);

	token_mock.assert_calls_async(1).await;

	Ok(())
}
