// self
use crate::{
	_prelude::*,
	obs::CacheOutcome,
	request::{CacheKey, CredentialVariant},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// A span builder used around cache lookups.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the provided variant + stage.
	pub fn new(variant: CredentialVariant, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("credential_broker.fetch", variant = variant.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (variant, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the log event matching a cache outcome.
///
/// The key is logged by fingerprint only; `error` is attached to failure events.
pub fn log_cache_event(
	variant: CredentialVariant,
	outcome: CacheOutcome,
	key: &CacheKey,
	error: Option<&Error>,
) {
	#[cfg(feature = "tracing")]
	{
		let key = key.fingerprint();

		match outcome {
			CacheOutcome::Hit =>
				tracing::debug!(variant = variant.as_str(), %key, "Reusing cached credential."),
			CacheOutcome::Miss =>
				tracing::info!(variant = variant.as_str(), %key, "Fetching {variant} credential."),
			CacheOutcome::Stored =>
				tracing::debug!(variant = variant.as_str(), %key, "Cached fetched credential."),
			CacheOutcome::Failure => match error {
				Some(error) => tracing::warn!(
					variant = variant.as_str(),
					%key,
					%error,
					"Failed getting {variant} credential."
				),
				None => tracing::warn!(
					variant = variant.as_str(),
					%key,
					"Failed getting {variant} credential."
				),
			},
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (variant, outcome, key, error);
	}
}
