//! Outbound HTTP helper that authorizes every request with a provider-issued token.
//!
//! [`BearerClient`] is bound to one identity and scope set. Each call obtains the bearer
//! header through [`TokenProvider::authorization_header`] before the request leaves the
//! process, so an unauthenticated request is never sent: a token failure aborts the call
//! with [`Error::AuthorizationUnavailable`].
//!
//! [`TokenProvider::authorization_header`]: crate::provider::TokenProvider::authorization_header

// crates.io
use oauth2::http::{
	HeaderValue,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use reqwest::{Method, Request, Response};
// self
use crate::{
	_prelude::*,
	auth::{IdentityId, ScopeSet},
	error::TransportError,
	provider::ReqwestTokenProvider,
};

/// Reqwest client that attaches `Authorization: Bearer` headers for one identity.
#[derive(Clone, Debug)]
pub struct BearerClient {
	provider: ReqwestTokenProvider,
	client: ReqwestClient,
	identity: IdentityId,
	scope: ScopeSet,
}
impl BearerClient {
	/// Creates a client for `identity` requesting the provider's default scopes.
	pub fn new(provider: ReqwestTokenProvider, identity: IdentityId) -> Self {
		let scope = provider.config.scopes.clone();

		Self { provider, client: ReqwestClient::default(), identity, scope }
	}

	/// Sends requests through a caller-configured reqwest client.
	pub fn with_client(mut self, client: ReqwestClient) -> Self {
		self.client = client;

		self
	}

	/// Overrides the scopes requested for this client's tokens.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Identity whose token authorizes the requests.
	pub fn identity(&self) -> &IdentityId {
		&self.identity
	}

	/// Provider backing this client.
	pub fn provider(&self) -> &ReqwestTokenProvider {
		&self.provider
	}

	/// Sends `request` with a freshly resolved bearer header.
	///
	/// Any `Authorization` header already present on the request is replaced.
	pub async fn execute(&self, mut request: Request) -> Result<Response> {
		let value = self.provider.authorization_header(&self.identity, &self.scope).await?;

		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(self.client.execute(request).await.map_err(TransportError::from)?)
	}

	/// Sends an authorized `GET`.
	pub async fn get(&self, url: Url) -> Result<Response> {
		self.execute(Request::new(Method::GET, url)).await
	}

	/// Sends an authorized `GET` carrying `body` encoded as JSON.
	///
	/// Some search APIs take their filter as a `GET` body.
	pub async fn get_with_body<B>(&self, url: Url, body: &B) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		self.execute(json_request(Method::GET, url, body)?).await
	}

	/// Sends an authorized `DELETE`.
	pub async fn delete(&self, url: Url) -> Result<Response> {
		self.execute(Request::new(Method::DELETE, url)).await
	}

	/// Sends an authorized `DELETE` carrying `body` encoded as JSON.
	pub async fn delete_with_body<B>(&self, url: Url, body: &B) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		self.execute(json_request(Method::DELETE, url, body)?).await
	}

	/// Sends an authorized `POST` with `body` encoded as JSON.
	pub async fn post<B>(&self, url: Url, body: &B) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		self.execute(json_request(Method::POST, url, body)?).await
	}

	/// Sends an authorized `PUT` with `body` encoded as JSON.
	pub async fn put<B>(&self, url: Url, body: &B) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		self.execute(json_request(Method::PUT, url, body)?).await
	}

	/// Sends an authorized `PATCH` with `body` encoded as JSON.
	pub async fn patch<B>(&self, url: Url, body: &B) -> Result<Response>
	where
		B: ?Sized + Serialize,
	{
		self.execute(json_request(Method::PATCH, url, body)?).await
	}
}

fn json_request<B>(method: Method, url: Url, body: &B) -> Result<Request>
where
	B: ?Sized + Serialize,
{
	let payload = serde_json::to_vec(body)?;
	let mut request = Request::new(method, url);

	request.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
	*request.body_mut() = Some(payload.into());

	Ok(request)
}
