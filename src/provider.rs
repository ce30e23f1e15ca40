//! Token provider: configuration plus the cache-aware request flow.
//!
//! `config` holds the validated [`ProviderConfig`] (token endpoint, client credentials,
//! default scopes, cache lifetime policy). [`TokenProvider`] combines a configuration with
//! a [`TokenCache`] and a [`TokenHttpClient`] and answers token requests per identity.

pub mod config;

mod token;

pub use config::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, IdentityId},
	cache::{CacheKey, TokenCache},
	error::ConfigError,
	http::TokenHttpClient,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// [`TokenProvider`] specialized for the reqwest-backed transport.
#[cfg(feature = "reqwest")]
pub type ReqwestTokenProvider = TokenProvider<ReqwestHttpClient>;

/// Acquires client-credentials tokens and caches them per identity.
///
/// The provider owns the transport, a shared [`TokenCache`], and its configuration. Clones
/// share all three plus the in-flight request guards, so a single instance can serve every
/// task in a process.
pub struct TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client used for token endpoint calls.
	pub http_client: Arc<C>,
	/// Cache consulted before and updated after each token request.
	pub cache: Arc<dyn TokenCache>,
	/// Validated provider configuration.
	pub config: ProviderConfig,
	flight_guards: Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>,
}
impl<C> TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a provider that uses a caller-supplied transport.
	///
	/// The configuration is validated first, so a provider never exists with a broken
	/// endpoint or cache policy.
	pub fn with_http_client(
		config: ProviderConfig,
		cache: Arc<dyn TokenCache>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		Ok(Self {
			http_client: http_client.into(),
			cache,
			config,
			flight_guards: Default::default(),
		})
	}

	/// Client identifier presented to the provider for `identity`.
	pub fn client_id_for(&self, identity: &IdentityId) -> ClientId {
		ClientId::derive(self.config.client_id_prefix.as_deref(), identity)
	}

	/// Cache key under which the token for `identity` is stored.
	pub fn cache_key_for(&self, identity: &IdentityId) -> CacheKey {
		CacheKey::for_identity(identity)
	}

	fn flight_guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.flight_guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	fn release_flight_guard(&self, key: &CacheKey, guard: Arc<AsyncMutex<()>>) {
		let mut guards = self.flight_guards.lock();

		// Two strong references remain when no other request waits: the map's and ours.
		if Arc::strong_count(&guard) <= 2 {
			guards.remove(key);
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenProvider<ReqwestHttpClient> {
	/// Creates a provider backed by a reqwest client built from the configuration.
	///
	/// The client never follows redirects and applies `request_timeout_secs` when set.
	pub fn new(config: ProviderConfig, cache: Arc<dyn TokenCache>) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		let http_client = ReqwestHttpClient::build(config.request_timeout())?;

		Self::with_http_client(config, cache, http_client)
	}
}
impl<C> Clone for TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			cache: Arc::clone(&self.cache),
			config: self.config.clone(),
			flight_guards: Arc::clone(&self.flight_guards),
		}
	}
}
impl<C> Debug for TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenProvider")
			.field("token_endpoint", &self.config.token_endpoint.as_str())
			.field("client_id_prefix", &self.config.client_id_prefix)
			.field("cache", &self.config.cache)
			.finish_non_exhaustive()
	}
}
