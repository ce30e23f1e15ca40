//! Thread-safe in-memory [`TokenCache`] with absolute and optional sliding expiration.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, ScopeSet, TokenSecret},
	cache::{CacheFuture, CacheKey, Clock, SystemClock, TokenCache},
};

type EntryMap = Arc<RwLock<HashMap<CacheKey, Entry>>>;

#[derive(Clone, Debug)]
struct Entry {
	token: CachedToken,
	last_access: OffsetDateTime,
}
impl Entry {
	fn is_live_at(&self, now: OffsetDateTime, sliding: Option<Duration>) -> bool {
		if self.token.is_expired_at(now) {
			return false;
		}

		sliding.is_none_or(|idle| {
			self.last_access.checked_add(idle).is_none_or(|deadline| now < deadline)
		})
	}
}

/// Process-local token cache; clones share the same entries.
///
/// Every entry carries an absolute expiry computed from the TTL passed to
/// [`TokenCache::set`]. When a sliding window is configured, an entry that has not been
/// read within that window is also treated as expired. Reads refresh the window but never
/// move the absolute expiry. Expired entries are removed when they are looked up.
#[derive(Clone, Debug)]
pub struct MemoryCache {
	entries: EntryMap,
	clock: Arc<dyn Clock>,
	sliding: Option<Duration>,
}
impl MemoryCache {
	/// Creates an empty cache driven by `clock`.
	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self { entries: Default::default(), clock, sliding: None }
	}

	/// Evicts entries that have not been read for longer than `window`.
	///
	/// Non-positive windows disable sliding expiration.
	pub fn with_sliding_expiration(mut self, window: Option<Duration>) -> Self {
		self.sliding = window.filter(|value| value.is_positive());

		self
	}

	/// Number of stored entries, including ones that expired but were not looked up yet.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Removes every expired entry and returns how many were dropped.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now();
		let mut guard = self.entries.write();
		let before = guard.len();

		guard.retain(|_, entry| entry.is_live_at(now, self.sliding));

		before - guard.len()
	}

	fn get_now(&self, key: &CacheKey) -> Option<CachedToken> {
		let now = self.clock.now();
		let mut guard = self.entries.write();
		let live = match guard.get_mut(key) {
			Some(entry) if entry.is_live_at(now, self.sliding) => {
				entry.last_access = now;

				Some(entry.token.clone())
			},
			Some(_) => None,
			None => return None,
		};

		if live.is_none() {
			guard.remove(key);
		}

		live
	}

	fn set_now(&self, key: CacheKey, access_token: TokenSecret, scope: ScopeSet, ttl: Duration) {
		let now = self.clock.now();
		let token = CachedToken::new(access_token, scope, now, ttl);

		self.entries.write().insert(key, Entry { token, last_access: now });
	}

	fn remove_now(&self, key: &CacheKey) -> Option<CachedToken> {
		let now = self.clock.now();

		self.entries
			.write()
			.remove(key)
			.filter(|entry| entry.is_live_at(now, self.sliding))
			.map(|entry| entry.token)
	}
}
impl Default for MemoryCache {
	fn default() -> Self {
		Self::with_clock(Arc::new(SystemClock))
	}
}
impl TokenCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>> {
		Box::pin(async move { self.get_now(key) })
	}

	fn set(
		&self,
		key: CacheKey,
		access_token: TokenSecret,
		scope: ScopeSet,
		ttl: Duration,
	) -> CacheFuture<'_, ()> {
		Box::pin(async move { self.set_now(key, access_token, scope, ttl) })
	}

	fn remove<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CachedToken>> {
		Box::pin(async move { self.remove_now(key) })
	}
}
