//! Credential fetchers: the remote exchanges performed on cache misses.
//!
//! [`CredentialFetcher`] is the seam between [`CredentialCache`](crate::cache::CredentialCache)
//! and the network. The crate ships a token-generator fetcher (Basic-auth `GET`) and a
//! JWT-bearer fetcher (signed assertion `POST`); tests plug in their own implementations.

pub mod assertion;
#[cfg(feature = "reqwest")] pub mod maskinporten;
#[cfg(feature = "reqwest")] pub mod token_generator;

pub use assertion::*;
#[cfg(feature = "reqwest")] pub use maskinporten::MaskinportenFetcher;
#[cfg(feature = "reqwest")] pub use token_generator::{TokenGeneratorFetcher, parse_bulk_tokens};

// self
use crate::{_prelude::*, auth::TokenSecret, cache::FreshnessPolicy, request::CredentialRequest};

/// Boxed future returned by [`CredentialFetcher::fetch`].
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Performs the remote exchange that produces a new credential.
pub trait CredentialFetcher
where
	Self: Send + Sync,
{
	/// Fetches a new token for an already validated request.
	///
	/// Implementations must not touch any cache; a returned error means nothing is stored.
	fn fetch<'a>(&'a self, request: &'a CredentialRequest) -> FetchFuture<'a, TokenSecret>;

	/// Tells the cache how to derive the expiry of tokens fetched for `request`.
	fn freshness(&self, request: &CredentialRequest) -> FreshnessPolicy;

	/// Returns the request exactly as it will be sent, so requests that differ only in
	/// implied defaults share one cache key.
	fn canonical_request<'a>(&self, request: &'a CredentialRequest) -> Cow<'a, CredentialRequest> {
		Cow::Borrowed(request)
	}
}
