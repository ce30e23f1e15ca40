// self
use crate::{
	_prelude::*,
	auth::{IdentityId, ScopeSet},
	cache::CacheKey,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedToken<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedToken<F> = F;

/// A span builder used around token requests.
#[derive(Clone, Debug)]
pub struct TokenSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl TokenSpan {
	/// Creates a new span tagged with the calling identity + stage.
	pub fn new(identity: &IdentityId, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth2_bearer.token", identity = identity.as_ref(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (identity, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedToken<Fut>
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

/// Emits a debug event for a cache hit.
pub fn log_cache_hit(key: &CacheKey) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(key = key.as_str(), "Serving access token from cache.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = key;
	}
}

/// Emits a debug event before the token endpoint is called.
pub fn log_cache_miss(key: &CacheKey) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(key = key.as_str(), "No cached access token; requesting a new one.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = key;
	}
}

/// Emits a debug event after a fetched token was stored.
pub fn log_token_stored(key: &CacheKey, ttl: Duration) {
	#[cfg(feature = "tracing")]
	{
		if ttl.is_positive() {
			tracing::debug!(
				key = key.as_str(),
				ttl_secs = ttl.as_seconds_f64(),
				"Cached fetched access token."
			);
		} else {
			tracing::debug!(
				key = key.as_str(),
				"Fetched access token expires too soon to be cached."
			);
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (key, ttl);
	}
}

/// Warns when a cached token was issued for other scopes than the ones requested now.
pub fn log_scope_mismatch(key: &CacheKey, cached: &ScopeSet, requested: &ScopeSet) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			key = key.as_str(),
			cached_scope = %cached,
			requested_scope = %requested,
			"Cached access token was issued for different scopes and is reused as is."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (key, cached, requested);
	}
}

/// Logs a failed token request with everything needed to diagnose it.
///
/// Provider-facing failures carry a [`TokenDiagnostic`](crate::error::TokenDiagnostic);
/// its client identifier, endpoint, response body, and root cause all end up on the event.
pub fn log_token_failure(identity: &IdentityId, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		match error.diagnostic() {
			Some(diagnostic) => tracing::error!(
				identity = identity.as_ref(),
				client_id = diagnostic.client_id.as_ref(),
				endpoint = %diagnostic.endpoint,
				status = diagnostic.status,
				root_cause = diagnostic.root_cause.as_deref(),
				"{diagnostic}"
			),
			None => tracing::error!(identity = identity.as_ref(), "Token request failed: {error}"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (identity, error);
	}
}
