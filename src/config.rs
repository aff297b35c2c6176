//! Validated fetcher configuration, built programmatically or loaded from the environment.
//!
//! Each config has a builder that checks URLs and durations before handing out a value, plus
//! `from_env`/`from_lookup` constructors reading the variables the load-test scripts use.

mod maskinporten;
mod token_generator;

pub use maskinporten::*;
pub use token_generator::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Default timeout applied to every token endpoint call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

fn resolve_url(
	field: &'static str,
	url: Option<Url>,
	default: &'static str,
) -> Result<Url, ConfigError> {
	let url = match url {
		Some(url) => url,
		None => Url::parse(default)
			.map_err(|_| ConfigError::InvalidUrl { field, url: default.into() })?,
	};

	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(ConfigError::InvalidUrl { field, url: url.to_string() });
	}

	Ok(url)
}

fn positive(field: &'static str, duration: Duration) -> Result<Duration, ConfigError> {
	if duration.is_positive() { Ok(duration) } else { Err(ConfigError::NonPositiveDuration { field }) }
}

fn required<L>(lookup: &mut L, name: &'static str) -> Result<String, ConfigError>
where
	L: FnMut(&str) -> Option<String>,
{
	lookup(name)
		.map(|value| value.trim().to_owned())
		.filter(|value| !value.is_empty())
		.ok_or(ConfigError::MissingEnv { name })
}
