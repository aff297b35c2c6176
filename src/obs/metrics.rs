// self
use crate::{obs::CacheOutcome, request::CredentialVariant};

/// Records a cache outcome via the global metrics recorder (when enabled).
pub fn record_cache_outcome(variant: CredentialVariant, outcome: CacheOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"credential_broker_cache_total",
			"variant" => variant.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (variant, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_cache_outcome_without_recorder_is_harmless() {
		for variant in CredentialVariant::ALL {
			record_cache_outcome(variant, CacheOutcome::Failure);
		}
	}
}
