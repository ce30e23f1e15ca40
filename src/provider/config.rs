//! Provider configuration: token endpoint, client credentials, default scopes, and the
//! cache lifetime policy.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
	cache::{Clock, MemoryCache},
};

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Errors raised while validating a [`ProviderConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// Token endpoint must be an HTTP(S) URL.
	#[error("The token endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Client identifier prefixes are joined into the client id and cannot contain whitespace.
	#[error("Client identifier prefix contains whitespace: {prefix}.")]
	InvalidClientIdPrefix {
		/// Offending prefix.
		prefix: String,
	},
	/// Cached lifetime must be a share of the declared lifetime between 1% and 100%.
	#[error("Cache lifetime percent must be between 1 and 100, got {percent}.")]
	LifetimePercentOutOfRange {
		/// Configured percentage.
		percent: u8,
	},
	/// Expiration windows and timeouts must be positive when set.
	#[error("The {setting} setting must be greater than zero.")]
	ZeroDuration {
		/// Name of the offending setting.
		setting: &'static str,
	},
}

/// How long fetched tokens stay in the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
	/// Disables caching entirely when false; every call then hits the token endpoint.
	pub enabled: bool,
	/// Share of the provider-declared `expires_in` a token is cached for.
	pub lifetime_percent: u8,
	/// Upper bound on the cache lifetime, in minutes.
	pub absolute_expiration_minutes: Option<u64>,
	/// Evicts entries that were not read for this many minutes.
	pub sliding_expiration_minutes: Option<u64>,
	/// Collapses concurrent misses for the same identity into one token request.
	pub single_flight: bool,
}
impl CachePolicy {
	/// Default share of the declared lifetime that a token is cached for.
	pub const DEFAULT_LIFETIME_PERCENT: u8 = 65;

	/// Computes the cache lifetime for a provider-declared `expires_in` (seconds).
	///
	/// The result is `lifetime_percent`% of the declared value, capped by the absolute
	/// expiration and never negative. Declared values of zero or less yield zero, which
	/// means "do not cache".
	pub fn cache_ttl(&self, declared_secs: i64) -> Duration {
		if declared_secs <= 0 {
			return Duration::ZERO;
		}

		let percent = i128::from(self.lifetime_percent.min(100));
		let millis = i128::from(declared_secs) * percent * 10;
		let ttl = Duration::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX));

		match self.absolute_expiration() {
			Some(cap) if cap < ttl => cap,
			_ => ttl,
		}
	}

	/// Absolute expiration cap as a duration.
	pub fn absolute_expiration(&self) -> Option<Duration> {
		self.absolute_expiration_minutes.map(minutes)
	}

	/// Sliding expiration window as a duration.
	pub fn sliding_expiration(&self) -> Option<Duration> {
		self.sliding_expiration_minutes.map(minutes)
	}

	/// Builds a [`MemoryCache`] honoring the sliding expiration window.
	pub fn memory_cache(&self, clock: Arc<dyn Clock>) -> MemoryCache {
		MemoryCache::with_clock(clock).with_sliding_expiration(self.sliding_expiration())
	}

	fn validate(&self) -> Result<(), ProviderConfigError> {
		if !(1..=100).contains(&self.lifetime_percent) {
			return Err(ProviderConfigError::LifetimePercentOutOfRange {
				percent: self.lifetime_percent,
			});
		}
		if self.absolute_expiration_minutes == Some(0) {
			return Err(ProviderConfigError::ZeroDuration {
				setting: "absolute_expiration_minutes",
			});
		}
		if self.sliding_expiration_minutes == Some(0) {
			return Err(ProviderConfigError::ZeroDuration {
				setting: "sliding_expiration_minutes",
			});
		}

		Ok(())
	}
}
impl Default for CachePolicy {
	fn default() -> Self {
		Self {
			enabled: true,
			lifetime_percent: Self::DEFAULT_LIFETIME_PERCENT,
			absolute_expiration_minutes: None,
			sliding_expiration_minutes: None,
			single_flight: true,
		}
	}
}

/// Everything a [`TokenProvider`](crate::provider::TokenProvider) needs to request tokens.
///
/// The struct deserializes from any serde format, so it can be loaded from whatever
/// configuration source the host application uses. Call [`ProviderConfig::validate`]
/// after deserializing, or build it through [`ProviderConfig::builder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// Token endpoint of the identity provider.
	pub token_endpoint: Url,
	/// Prefix joined with each identity to form the client identifier.
	#[serde(default)]
	pub client_id_prefix: Option<String>,
	/// Client secret presented with every token request.
	#[serde(default)]
	pub client_secret: Option<TokenSecret>,
	/// Scopes requested when the caller does not supply its own.
	#[serde(default)]
	pub scopes: ScopeSet,
	/// How the client authenticates against the token endpoint.
	#[serde(default)]
	pub client_auth_method: ClientAuthMethod,
	/// Timeout applied to token requests by the built-in transport, in seconds.
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
	/// Cache lifetime policy.
	#[serde(default)]
	pub cache: CachePolicy,
}
impl ProviderConfig {
	/// Creates a new builder for the provided token endpoint.
	pub fn builder(token_endpoint: Url) -> ProviderConfigBuilder {
		ProviderConfigBuilder::new(token_endpoint)
	}

	/// Timeout applied to token requests, if configured.
	pub fn request_timeout(&self) -> Option<std::time::Duration> {
		self.request_timeout_secs.map(std::time::Duration::from_secs)
	}

	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), ProviderConfigError> {
		if !matches!(self.token_endpoint.scheme(), "http" | "https") {
			return Err(ProviderConfigError::UnsupportedScheme {
				url: self.token_endpoint.to_string(),
			});
		}
		if let Some(prefix) = self.client_id_prefix.as_deref()
			&& prefix.chars().any(char::is_whitespace)
		{
			return Err(ProviderConfigError::InvalidClientIdPrefix { prefix: prefix.to_owned() });
		}
		if self.request_timeout_secs == Some(0) {
			return Err(ProviderConfigError::ZeroDuration { setting: "request_timeout_secs" });
		}

		self.cache.validate()
	}
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
	config: ProviderConfig,
}
impl ProviderConfigBuilder {
	fn new(token_endpoint: Url) -> Self {
		Self {
			config: ProviderConfig {
				token_endpoint,
				client_id_prefix: None,
				client_secret: None,
				scopes: ScopeSet::default(),
				client_auth_method: ClientAuthMethod::default(),
				request_timeout_secs: None,
				cache: CachePolicy::default(),
			},
		}
	}

	/// Sets the prefix joined with each identity to form the client identifier.
	pub fn client_id_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.config.client_id_prefix = Some(prefix.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.config.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Sets the default scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.config.scopes = scopes;

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.config.client_auth_method = method;

		self
	}

	/// Sets the token request timeout (whole seconds).
	pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
		self.config.request_timeout_secs = Some(timeout.as_secs());

		self
	}

	/// Overrides the cache policy.
	pub fn cache(mut self, policy: CachePolicy) -> Self {
		self.config.cache = policy;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn minutes(value: u64) -> Duration {
	Duration::minutes(i64::try_from(value).unwrap_or(i64::MAX / 60))
}
