//! Cached access token entries and their lifecycle helpers.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
};

/// Access token held by a [`TokenCache`](crate::cache::TokenCache) until its expiry instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Scopes the token was requested with.
	pub scope: ScopeSet,
	/// Instant the entry was written into the cache.
	pub cached_at: OffsetDateTime,
	/// Instant at (and after) which the entry must no longer be handed out.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Builds an entry that stays valid for `ttl` after `now`; negative TTLs clamp to zero.
	///
	/// Expiry instants past the representable range saturate to the latest supported
	/// instant.
	pub fn new(
		access_token: TokenSecret,
		scope: ScopeSet,
		now: OffsetDateTime,
		ttl: Duration,
	) -> Self {
		let ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		let expires_at = now.checked_add(ttl).unwrap_or(PrimitiveDateTime::MAX.assume_utc());

		Self { access_token, scope, cached_at: now, expires_at }
	}

	/// Returns `true` if the entry has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Remaining lifetime at the provided instant, never negative.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn scope() -> ScopeSet {
		ScopeSet::new(["orders.read"]).expect("Scope fixture should be valid.")
	}

	#[test]
	fn expiry_is_exclusive_of_the_expiry_instant() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::new(TokenSecret::new("abc123"), scope(), now, Duration::seconds(65));

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 00:01:05 UTC));
		assert!(!token.is_expired_at(now + Duration::seconds(60)));
		assert!(token.is_expired_at(now + Duration::seconds(65)));
		assert!(token.is_expired_at(now + Duration::seconds(70)));
	}

	#[test]
	fn negative_ttl_expires_immediately() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::new(TokenSecret::new("abc123"), scope(), now, Duration::seconds(-5));

		assert_eq!(token.expires_at, now);
		assert!(token.is_expired_at(now));
		assert_eq!(token.remaining_at(now + Duration::seconds(1)), Duration::ZERO);
	}

	#[test]
	fn oversized_ttl_saturates_instead_of_overflowing() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let ttl = Duration::milliseconds(i64::MAX);
		let token = CachedToken::new(TokenSecret::new("abc123"), scope(), now, ttl);

		assert_eq!(token.expires_at, PrimitiveDateTime::MAX.assume_utc());
		assert!(!token.is_expired_at(macros::datetime!(9999-01-01 00:00 UTC)));
		assert!(token.remaining_at(now).is_positive());
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::new(TokenSecret::new("abc123"), scope(), now, Duration::minutes(1));

		assert!(!format!("{token:?}").contains("abc123"));
	}
}
