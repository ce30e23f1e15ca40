//! Token cache contract and the built-in in-memory implementation.

pub mod clock;
pub mod memory;

pub use clock::*;
pub use memory::MemoryCache;

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, IdentityId, ScopeSet, TokenSecret},
};

/// Boxed future returned by [`TokenCache`] operations.
///
/// Cache operations never fail: a missing or expired entry is reported as `None`.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a + Send>>;

/// Key-value store with per-entry time-to-live, shared by every caller of a provider.
///
/// Implementations must make each call atomic per key. No cross-key transactions are
/// required, and the check-then-fetch-then-store sequence is coordinated by the provider.
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns the entry for `key` unless it is absent or expired.
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>>;

	/// Stores `access_token` under `key`, replacing any previous entry, for `ttl`.
	fn set(
		&self,
		key: CacheKey,
		access_token: TokenSecret,
		scope: ScopeSet,
		ttl: Duration,
	) -> CacheFuture<'_, ()>;

	/// Drops the entry for `key`, returning it when one was present and still live.
	fn remove<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>>;
}

/// Cache key derived from a calling identity: `{identity}-token`, lower-cased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);
impl CacheKey {
	/// Builds the key for the provided identity.
	pub fn for_identity(identity: &IdentityId) -> Self {
		Self(format!("{}-token", identity.to_lowercase()))
	}

	/// Returns the raw key string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for CacheKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn key_depends_on_identity_only() {
		let upper = IdentityId::new("3F2504E0-4F89").expect("Identity fixture should be valid.");
		let lower = IdentityId::new("3f2504e0-4f89").expect("Identity fixture should be valid.");
		let other = IdentityId::new("tenant-b").expect("Identity fixture should be valid.");

		assert_eq!(CacheKey::for_identity(&upper).as_str(), "3f2504e0-4f89-token");
		assert_eq!(CacheKey::for_identity(&upper), CacheKey::for_identity(&lower));
		assert_ne!(CacheKey::for_identity(&upper), CacheKey::for_identity(&other));
	}
}
