//! Demonstrates fetching a client-credentials token once, reusing it from the in-memory
//! cache, and attaching it to an outbound API call.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use oauth2_bearer::{
	auth::{IdentityId, ScopeSet},
	cache::{MemoryCache, TokenCache},
	client::BearerClient,
	http::ReqwestHttpClient,
	provider::{ProviderConfig, ReqwestTokenProvider},
	reqwest::Client as ReqwestClient,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/connect/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/orders").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let config = ProviderConfig::builder(Url::parse(&server.url("/connect/token"))?)
		.client_id_prefix("orders-api")
		.client_secret("super-secret")
		.scopes(ScopeSet::new(["orders.read"])?)
		.build()?;
	let cache: Arc<dyn TokenCache> = Arc::new(MemoryCache::default());
	// The mock server presents a self-signed certificate.
	let http = ReqwestClient::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()?;
	let provider = ReqwestTokenProvider::with_http_client(
		config,
		cache,
		ReqwestHttpClient::with_client(http.clone()),
	)?;
	let identity = IdentityId::new("3F2504E0-4F89-11D3-9A0C-0305E82C3301")?;
	let client = BearerClient::new(provider.clone(), identity.clone()).with_client(http);

	for _ in 0..3 {
		let response = client.get(Url::parse(&server.url("/orders"))?).await?;

		println!("Orders API answered {}.", response.status());
	}

	println!("Client identifier: {}.", provider.client_id_for(&identity));

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(3).await;

	Ok(())
}
