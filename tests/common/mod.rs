//! Fixtures shared by the provider integration suites.

#![allow(dead_code)]

// std
use std::{sync::Arc, time::Duration};
// crates.io
use httpmock::{Mock, prelude::*};
use time::macros;
use url::Url;
// self
use oauth2_bearer::{
	auth::{IdentityId, ScopeSet},
	cache::{ManualClock, MemoryCache, TokenCache},
	http::ReqwestHttpClient,
	provider::{CachePolicy, ProviderConfig, ReqwestTokenProvider},
	reqwest::Client as ReqwestClient,
};

pub const TOKEN_PATH: &str = "/connect/token";
pub const CLIENT_ID_PREFIX: &str = "svc";
pub const CLIENT_SECRET: &str = "s3cr3t";

pub struct Fixture {
	pub provider: ReqwestTokenProvider,
	pub cache: MemoryCache,
	pub clock: ManualClock,
}

pub fn identity(value: &str) -> IdentityId {
	IdentityId::new(value).expect("Identity fixture should be valid.")
}

pub fn scope(values: &[&str]) -> ScopeSet {
	ScopeSet::new(values.iter().copied()).expect("Scope fixture should be valid.")
}

pub fn token_body(access_token: &str, expires_in: i64) -> String {
	format!(
		"{{\"access_token\":\"{access_token}\",\"token_type\":\"bearer\",\"expires_in\":{expires_in}}}"
	)
}

pub fn token_endpoint(server: &MockServer) -> Url {
	Url::parse(&server.url(TOKEN_PATH)).expect("Mock token endpoint should parse.")
}

pub fn config(endpoint: Url, policy: CachePolicy) -> ProviderConfig {
	ProviderConfig::builder(endpoint)
		.client_id_prefix(CLIENT_ID_PREFIX)
		.client_secret(CLIENT_SECRET)
		.scopes(scope(&["orders.read"]))
		.request_timeout(Duration::from_secs(5))
		.cache(policy)
		.build()
		.expect("Provider configuration fixture should be valid.")
}

/// Builds a reqwest client that accepts the self-signed certificates served by `httpmock`.
pub fn test_reqwest_client() -> ReqwestClient {
	ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(oauth2_bearer::reqwest::redirect::Policy::none())
		.timeout(Duration::from_secs(5))
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

pub fn fixture(endpoint: Url, policy: CachePolicy) -> Fixture {
	let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
	let cache = policy.memory_cache(Arc::new(clock.clone()));
	let shared: Arc<dyn TokenCache> = Arc::new(cache.clone());
	let provider = ReqwestTokenProvider::with_http_client(
		config(endpoint, policy),
		shared,
		ReqwestHttpClient::with_client(test_reqwest_client()),
	)
	.expect("Provider fixture should build.");

	Fixture { provider, cache, clock }
}

pub async fn mock_token<'a>(
	server: &'a MockServer,
	access_token: &str,
	expires_in: i64,
) -> Mock<'a> {
	let body = token_body(access_token, expires_in);

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await
}

#[cfg(feature = "tracing")]
pub use logs::LogBuffer;

#[cfg(feature = "tracing")]
mod logs {
	// std
	use std::{io, sync::Arc};
	// crates.io
	use parking_lot::Mutex;
	use tracing::subscriber::DefaultGuard;

	/// In-memory sink for formatted log lines.
	#[derive(Clone, Default)]
	pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);
	impl LogBuffer {
		/// Routes events emitted on the current thread into this buffer.
		pub fn install(&self) -> DefaultGuard {
			let buffer = self.clone();
			let subscriber = tracing_subscriber::fmt()
				.with_ansi(false)
				.with_max_level(tracing::Level::DEBUG)
				.with_writer(move || buffer.clone())
				.finish();

			tracing::subscriber::set_default(subscriber)
		}

		pub fn contents(&self) -> String {
			String::from_utf8_lossy(&self.0.lock()).into_owned()
		}
	}
	impl io::Write for LogBuffer {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().extend_from_slice(buf);

			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}
}
