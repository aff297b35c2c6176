// crates.io
use httpmock::prelude::*;
use time::Duration;
// self
use credential_broker::{
	cache::CredentialCache,
	config::TokenGeneratorConfig,
	error::{ConfigError, Error, ParseError},
	fetch::TokenGeneratorFetcher,
	request::CredentialRequest,
	url::Url,
};

const USERNAME: &str = "loadtest-user";
const PASSWORD: &str = "loadtest-pass";
const BASIC_AUTH: &str = "Basic bG9hZHRlc3QtdXNlcjpsb2FkdGVzdC1wYXNz";

fn build_cache(server: &MockServer) -> CredentialCache<TokenGeneratorFetcher> {
	let config = TokenGeneratorConfig::builder(USERNAME, PASSWORD)
		.base_url(Url::parse(&server.base_url()).expect("Mock base URL should parse."))
		.request_timeout(Duration::seconds(5))
		.build()
		.expect("Token generator config should be valid.");
	let fetcher = TokenGeneratorFetcher::new(config).expect("Fetcher should build.");

	CredentialCache::<TokenGeneratorFetcher>::new(fetcher)
}

#[tokio::test]
async fn personal_token_is_fetched_once_and_cached() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/GetPersonalToken")
				.header("authorization", BASIC_AUTH)
				.query_param("env", "yt01")
				.query_param("scopes", "a:b")
				.query_param("ttl", "3600")
				.query_param("pid", "01017012345");
			then.status(200).body("personal-token\n");
		})
		.await;
	let request = CredentialRequest::personal([("scopes", "a:b"), ("pid", "01017012345")])
		.expect("Personal request should be valid.");
	let first = cache.get(&request).await.expect("First lookup should fetch.");
	let second = cache.get(&request).await.expect("Second lookup should hit.");

	mock.assert_calls_async(1).await;

	assert_eq!(first.token.expose(), "personal-token");
	assert_eq!(first.token, second.token);
	assert_eq!(first.expires_at - first.issued_at, Duration::HOUR);
}

#[tokio::test]
async fn implied_and_explicit_defaults_share_one_entry() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/GetPersonalToken")
				.query_param("env", "yt01")
				.query_param("scopes", "a:b")
				.query_param("ttl", "3600");
			then.status(200).body("personal-token");
		})
		.await;
	let implied =
		CredentialRequest::personal([("scopes", "a:b")]).expect("Implied request should be valid.");
	let explicit =
		CredentialRequest::personal([("scopes", "a:b"), ("env", "yt01"), ("ttl", "3600")])
			.expect("Explicit request should be valid.");
	let first = cache.token(&implied).await.expect("First lookup should fetch.");
	let second = cache.token(&explicit).await.expect("Explicit defaults should hit.");

	mock.assert_calls_async(1).await;

	assert_eq!(first, second);
	assert_eq!(cache.len(), 1);
	assert!(cache.peek(&explicit).is_some());
}

#[tokio::test]
async fn enterprise_options_and_ttl_reach_the_generator() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/GetEnterpriseToken")
				.query_param("env", "tt02")
				.query_param("orgNo", "991825827")
				.query_param("scopes", "altinn:serviceowner digdir:dialogporten")
				.query_param("ttl", "600");
			then.status(200).body("enterprise-token");
		})
		.await;
	let request = CredentialRequest::enterprise([
		("env", "tt02"),
		("orgNo", "991825827"),
		("scopes", "digdir:dialogporten altinn:serviceowner"),
		("ttl", "600"),
	])
	.expect("Enterprise request should be valid.");
	let record = cache.get(&request).await.expect("Enterprise lookup should fetch.");

	mock.assert_async().await;

	assert_eq!(record.token.expose(), "enterprise-token");
	assert_eq!(record.expires_at - record.issued_at, Duration::seconds(600));
}

#[tokio::test]
async fn unauthorized_response_leaves_cache_empty() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/GetPersonalToken");
			then.status(401).body("Unauthorized");
		})
		.await;
	let request = CredentialRequest::personal([("scopes", "a:b"), ("env", "yt01")])
		.expect("Personal request should be valid.");
	let err = cache.get(&request).await.expect_err("401 must surface as an error.");

	mock.assert_calls_async(1).await;

	match err {
		Error::Fetch(fetch) => {
			assert_eq!(fetch.status, 401);
			assert_eq!(fetch.body, "Unauthorized");
			assert_eq!(fetch.variant, "personal");
		},
		other => panic!("Expected a fetch error, got {other:?}."),
	}

	assert!(cache.is_empty());
}

#[tokio::test]
async fn empty_body_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/GetPlatformToken").query_param("app", "ttd/loadtest");
			then.status(200).body("  ");
		})
		.await;
	let request = CredentialRequest::platform([("app", "ttd/loadtest")])
		.expect("Platform request should be valid.");
	let err = cache.get(&request).await.expect_err("Empty body must be rejected.");

	assert!(matches!(err, Error::Parse(ParseError::EmptyBody)));
	assert!(cache.is_empty());
}

#[tokio::test]
async fn maskinporten_request_never_reaches_the_generator() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET);
			then.status(200).body("unexpected");
		})
		.await;
	let request = CredentialRequest::maskinporten("a:b").expect("Valid request.");
	let err = cache.get(&request).await.expect_err("Unsupported variant must fail.");

	mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::Config(ConfigError::UnsupportedVariant { .. })));
}

#[tokio::test]
async fn bulk_tokens_decode_into_a_map() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/GetPersonalToken").query_param("bulkCount", "2");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"20001234":"token-a","20005678":"token-b"}"#);
		})
		.await;
	let request = CredentialRequest::personal([("bulkCount", "2"), ("scopes", "a:b")])
		.expect("Bulk request should be valid.");
	let tokens = cache.fetcher().fetch_bulk(&request).await.expect("Bulk payload should decode.");

	mock.assert_async().await;

	assert_eq!(tokens.len(), 2);
	assert_eq!(tokens.get("20005678").map(String::as_str), Some("token-b"));
	assert!(cache.is_empty());
}
