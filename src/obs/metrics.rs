// self
use crate::obs::TokenOutcome;

/// Records a token request outcome via the global metrics recorder (when enabled).
pub fn record_token_outcome(outcome: TokenOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_bearer_token_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
