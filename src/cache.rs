//! Credential cache with freshness checks and singleflight refetches.
//!
//! [`CredentialCache::get`] serves a stored credential while
//! `now < expires_at - safety_margin` and otherwise asks its [`CredentialFetcher`] for a new
//! one. Expiry comes from the fetcher's [`FreshnessPolicy`]: either a fixed TTL counted from
//! the moment the request is sent or the token's own `exp` claim. Failed fetches leave the
//! store untouched and are returned as-is; nothing is retried. A per-[`CacheKey`] guard makes
//! concurrent misses for the same key share one fetch; the guard is dropped once no caller
//! needs it.

mod clock;

pub use clock::*;

// self
use crate::{
	_prelude::*,
	auth::{self, CachedCredential, TokenSecret},
	error::ConfigError,
	fetch::CredentialFetcher,
	obs::{self, CacheOutcome, FetchSpan},
	request::{CacheKey, CredentialRequest},
	store::{CredentialStore, MemoryStore},
};

/// Buffer subtracted from expiry so a credential never expires mid-request.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::seconds(10);

/// How a freshly fetched credential's expiry is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreshnessPolicy {
	/// Credential lives for a fixed duration counted from the moment the fetch started.
	Ttl(Duration),
	/// Credential is a JWT; expiry is read from its `exp` claim.
	ExpiryClaim,
}

/// Explicit credential cache owned by one execution context.
pub struct CredentialCache<F>
where
	F: ?Sized + CredentialFetcher,
{
	fetcher: Arc<F>,
	store: Arc<dyn CredentialStore>,
	clock: Arc<dyn Clock>,
	safety_margin: Duration,
	guards: Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>,
}
impl<F> CredentialCache<F>
where
	F: ?Sized + CredentialFetcher,
{
	/// Creates an empty cache backed by [`MemoryStore`] and the system clock.
	pub fn new(fetcher: impl Into<Arc<F>>) -> Self {
		Self {
			fetcher: fetcher.into(),
			store: Arc::new(MemoryStore::default()),
			clock: Arc::new(SystemClock),
			safety_margin: DEFAULT_SAFETY_MARGIN,
			guards: Default::default(),
		}
	}

	/// Replaces the time source.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Replaces the storage backend.
	pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = store;

		self
	}

	/// Overrides the safety margin (defaults to 10 seconds). Negative values clamp to zero.
	pub fn with_safety_margin(mut self, margin: Duration) -> Self {
		self.safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Fetcher used on cache misses.
	pub fn fetcher(&self) -> &Arc<F> {
		&self.fetcher
	}

	/// Safety margin applied to every freshness check.
	pub fn safety_margin(&self) -> Duration {
		self.safety_margin
	}

	/// Returns a fresh credential for `request`, fetching only when the cached one is missing
	/// or stale.
	pub async fn get(&self, request: &CredentialRequest) -> Result<CachedCredential> {
		let request = self.fetcher.canonical_request(request);
		let span = FetchSpan::new(request.variant(), "get");

		span.instrument(async move {
			let request = &*request;
			let key = request.cache_key();

			if let Some(hit) = self.fresh_entry(&key) {
				self.observe(request, CacheOutcome::Hit, &key, None);

				return Ok(hit);
			}

			let guard = self.guard(&key);
			let result = self.fill(request, &key, &guard).await;

			drop(guard);
			self.release_guard(&key);

			result
		})
		.await
	}

	/// Convenience wrapper around [`get`](Self::get) returning only the token.
	pub async fn token(&self, request: &CredentialRequest) -> Result<TokenSecret> {
		self.get(request).await.map(|record| record.token)
	}

	/// Returns the stored entry for `request` without checking freshness or fetching.
	pub fn peek(&self, request: &CredentialRequest) -> Option<CachedCredential> {
		self.store.fetch(&self.fetcher.canonical_request(request).cache_key())
	}

	/// Drops the entry for `request`, forcing the next lookup to fetch.
	pub fn invalidate(&self, request: &CredentialRequest) -> Option<CachedCredential> {
		let key = self.fetcher.canonical_request(request).cache_key();

		self.release_guard(&key);

		self.store.remove(&key)
	}

	/// Number of cached entries, stale ones included.
	pub fn len(&self) -> usize {
		self.store.len()
	}

	/// Returns `true` when nothing has been cached yet.
	pub fn is_empty(&self) -> bool {
		self.store.is_empty()
	}

	fn fresh_entry(&self, key: &CacheKey) -> Option<CachedCredential> {
		let now = self.clock.now();

		self.store.fetch(key).filter(|record| record.is_fresh_at(now, self.safety_margin))
	}

	async fn fill(
		&self,
		request: &CredentialRequest,
		key: &CacheKey,
		guard: &AsyncMutex<()>,
	) -> Result<CachedCredential> {
		let _singleflight = guard.lock().await;

		// Another caller may have refreshed the entry while this one waited.
		if let Some(hit) = self.fresh_entry(key) {
			self.observe(request, CacheOutcome::Hit, key, None);

			return Ok(hit);
		}

		self.observe(request, CacheOutcome::Miss, key, None);

		match self.refresh(request, key).await {
			Ok(record) => {
				self.observe(request, CacheOutcome::Stored, key, None);

				Ok(record)
			},
			Err(err) => {
				self.observe(request, CacheOutcome::Failure, key, Some(&err));

				Err(err)
			},
		}
	}

	async fn refresh(
		&self,
		request: &CredentialRequest,
		key: &CacheKey,
	) -> Result<CachedCredential> {
		// TTL expiry counts from the moment the request went out, not from when it returned.
		let requested_at = self.clock.now();
		let token = self.fetcher.fetch(request).await?;
		let builder = CachedCredential::builder().issued_at(requested_at);
		let builder = match self.fetcher.freshness(request) {
			FreshnessPolicy::Ttl(ttl) => builder.expires_in(ttl),
			FreshnessPolicy::ExpiryClaim =>
				builder.expires_at(auth::decode_live_expiry(token.expose(), self.clock.now())?),
		};
		let record = builder.token(token).build().map_err(ConfigError::from)?;

		self.store.save(key.clone(), record.clone());

		Ok(record)
	}

	fn guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	fn release_guard(&self, key: &CacheKey) {
		let mut guards = self.guards.lock();

		// A count of one means no caller holds or awaits the guard any more.
		if guards.get(key).is_some_and(|guard| Arc::strong_count(guard) == 1) {
			guards.remove(key);
		}
	}

	fn observe(
		&self,
		request: &CredentialRequest,
		outcome: CacheOutcome,
		key: &CacheKey,
		error: Option<&Error>,
	) {
		obs::record_cache_outcome(request.variant(), outcome);
		obs::log_cache_event(request.variant(), outcome, key, error);
	}
}
impl<F> Debug for CredentialCache<F>
where
	F: ?Sized + CredentialFetcher,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("entries", &self.store.len())
			.field("safety_margin", &self.safety_margin)
			.finish()
	}
}
