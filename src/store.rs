//! Storage contract behind [`CredentialCache`](crate::cache::CredentialCache) and the built-in
//! in-memory implementation.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{auth::CachedCredential, request::CacheKey};

/// Storage backend contract for cached credentials.
///
/// Entries are never evicted by age; the cache overwrites them in place after a refetch.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the record stored under `key`, if present.
	fn fetch(&self, key: &CacheKey) -> Option<CachedCredential>;

	/// Persists or replaces the record stored under `key`.
	fn save(&self, key: CacheKey, record: CachedCredential);

	/// Removes and returns the record stored under `key`.
	fn remove(&self, key: &CacheKey) -> Option<CachedCredential>;

	/// Number of stored records.
	fn len(&self) -> usize;

	/// Returns `true` when nothing is stored.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
