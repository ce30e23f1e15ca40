//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oauth2_bearer.token` with the
//!   `identity` and `stage` fields, plus events for cache hits, stores, scope mismatches,
//!   and failed token requests.
//! - Enable `metrics` to increment the `oauth2_bearer_token_total` counter for every
//!   cache hit, fetched token, and failure, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each token request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenOutcome {
	/// A live cache entry answered the request.
	CacheHit,
	/// The token endpoint issued a new token.
	Fetched,
	/// Failure propagated back to the caller.
	Failure,
}
impl TokenOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenOutcome::CacheHit => "cache_hit",
			TokenOutcome::Fetched => "fetched",
			TokenOutcome::Failure => "failure",
		}
	}
}
impl Display for TokenOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
