//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::CachedCredential,
	request::CacheKey,
	store::CredentialStore,
};

type StoreMap = Arc<RwLock<HashMap<CacheKey, CachedCredential>>>;

/// Process-local store; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl CredentialStore for MemoryStore {
	fn fetch(&self, key: &CacheKey) -> Option<CachedCredential> {
		self.0.read().get(key).cloned()
	}

	fn save(&self, key: CacheKey, record: CachedCredential) {
		self.0.write().insert(key, record);
	}

	fn remove(&self, key: &CacheKey) -> Option<CachedCredential> {
		self.0.write().remove(key)
	}

	fn len(&self) -> usize {
		self.0.read().len()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{auth::TokenSecret, request::CredentialRequest};

	fn record(token: &str) -> CachedCredential {
		CachedCredential::builder()
			.token(TokenSecret::new(token))
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Record fixture should build.")
	}

	#[test]
	fn save_replaces_in_place_and_clones_share_state() {
		let store = MemoryStore::default();
		let shared = store.clone();
		let key = CredentialRequest::personal([("env", "yt01")])
			.expect("Request fixture should be valid.")
			.cache_key();

		assert!(store.is_empty());

		store.save(key.clone(), record("first"));
		shared.save(key.clone(), record("second"));

		assert_eq!(store.len(), 1);
		assert_eq!(
			store.fetch(&key).expect("Record should be present.").token.expose(),
			"second"
		);
		assert!(shared.remove(&key).is_some());
		assert!(store.fetch(&key).is_none());
	}
}
