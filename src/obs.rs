//! Optional observability helpers for cache lookups and fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every lookup inside a span named `credential_broker.fetch` with the
//!   `variant` and `stage` fields, and to emit hit/miss/store/failure events. Events carry the
//!   cache key fingerprint, never the token or raw option values.
//! - Enable `metrics` to increment the `credential_broker_cache_total` counter for every
//!   outcome, labeled by `variant` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each cache lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheOutcome {
	/// Fresh credential served from the cache.
	Hit,
	/// No fresh credential; a fetch is about to start.
	Miss,
	/// Fetched credential written to the cache.
	Stored,
	/// Fetch or expiry derivation failed; nothing was written.
	Failure,
}
impl CacheOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheOutcome::Hit => "hit",
			CacheOutcome::Miss => "miss",
			CacheOutcome::Stored => "stored",
			CacheOutcome::Failure => "failure",
		}
	}
}
impl Display for CacheOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
