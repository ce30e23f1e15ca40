//! Cache-aware token request flow.
//!
//! A request first consults the cache. On a miss it takes the per-key single-flight guard
//! (unless disabled), re-checks the cache so callers that queued behind a fetch reuse its
//! result, and only then calls the token endpoint. The cache is written only after a
//! complete successful response, so dropping the request future at any `.await` point
//! leaves the cache untouched.

// crates.io
use oauth2::http::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::{IdentityId, ScopeSet, TokenSecret},
	cache::CacheKey,
	ext::bearer_header_value,
	http::TokenHttpClient,
	oauth::{BasicFacade, IssuedToken, OAuth2Facade},
	obs::{self, TokenOutcome, TokenSpan},
	provider::TokenProvider,
};

impl<C> TokenProvider<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Returns a valid access token for `identity`, fetching one when the cache has none.
	///
	/// Failures are logged with the client identifier, the endpoint, and the provider's
	/// response body before they are returned. Failed fetches never populate the cache, so
	/// the next call tries the token endpoint again.
	pub async fn request_token(
		&self,
		identity: &IdentityId,
		scope: &ScopeSet,
	) -> Result<TokenSecret> {
		let span = TokenSpan::new(identity, "request_token");

		span.instrument(async move {
			let policy = self.config.cache;

			if !policy.enabled {
				return self.fetch(identity, scope).await.map(|issued| issued.access_token);
			}

			let key = self.cache_key_for(identity);

			if let Some(hit) = self.cached(&key, scope).await {
				return Ok(hit);
			}
			if !policy.single_flight {
				return self.fetch_and_store(key, identity, scope).await;
			}

			let guard = self.flight_guard(&key);
			let result = {
				let _singleflight = guard.lock().await;

				match self.cached(&key, scope).await {
					Some(hit) => Ok(hit),
					None => self.fetch_and_store(key.clone(), identity, scope).await,
				}
			};

			self.release_flight_guard(&key, guard);

			result
		})
		.await
	}

	/// Nullable variant of [`request_token`](Self::request_token).
	///
	/// The failure has already been logged by the time `None` is returned.
	pub async fn get_token(&self, identity: &IdentityId, scope: &ScopeSet) -> Option<TokenSecret> {
		self.request_token(identity, scope).await.ok()
	}

	/// Produces the `Authorization: Bearer <token>` header value for `identity`.
	///
	/// Call sites that must never send an unauthenticated request use this method: any
	/// failure to obtain a token surfaces as [`Error::AuthorizationUnavailable`], never as a
	/// silently missing header.
	pub async fn authorization_header(
		&self,
		identity: &IdentityId,
		scope: &ScopeSet,
	) -> Result<HeaderValue> {
		let token =
			self.request_token(identity, scope).await.map_err(Error::authorization_unavailable)?;

		bearer_header_value(&token).map_err(Error::authorization_unavailable)
	}

	/// Drops the cached token for `identity`, forcing the next request to fetch a new one.
	///
	/// Returns `true` when a live entry was removed.
	pub async fn invalidate(&self, identity: &IdentityId) -> bool {
		let key = self.cache_key_for(identity);

		self.cache.remove(&key).await.is_some()
	}

	async fn cached(&self, key: &CacheKey, scope: &ScopeSet) -> Option<TokenSecret> {
		let hit = self.cache.get(key).await?;

		if hit.scope != *scope {
			obs::log_scope_mismatch(key, &hit.scope, scope);
		}

		obs::log_cache_hit(key);
		obs::record_token_outcome(TokenOutcome::CacheHit);

		Some(hit.access_token)
	}

	async fn fetch_and_store(
		&self,
		key: CacheKey,
		identity: &IdentityId,
		scope: &ScopeSet,
	) -> Result<TokenSecret> {
		obs::log_cache_miss(&key);

		let issued = self.fetch(identity, scope).await?;
		let ttl = self.config.cache.cache_ttl(issued.expires_in);

		if ttl.is_positive() {
			self.cache.set(key.clone(), issued.access_token.clone(), scope.clone(), ttl).await;
		}

		obs::log_token_stored(&key, ttl);

		Ok(issued.access_token)
	}

	async fn fetch(&self, identity: &IdentityId, scope: &ScopeSet) -> Result<IssuedToken> {
		let result = self.exchange(identity, scope).await;

		match &result {
			Ok(_) => obs::record_token_outcome(TokenOutcome::Fetched),
			Err(err) => {
				obs::log_token_failure(identity, err);
				obs::record_token_outcome(TokenOutcome::Failure);
			},
		}

		result
	}

	async fn exchange(&self, identity: &IdentityId, scope: &ScopeSet) -> Result<IssuedToken> {
		let facade: BasicFacade<C> = BasicFacade::from_config(
			&self.config,
			self.client_id_for(identity),
			self.http_client.clone(),
		)?;

		facade.exchange_client_credentials(scope).await
	}
}
