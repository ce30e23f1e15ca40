//! Internal OAuth client facade for the client-credentials grant.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId as OAuthClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, TokenSecret},
	error::{ConfigError, TokenDiagnostic},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient, body_preview},
	provider::{ClientAuthMethod, ProviderConfig},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Access token issued by the token endpoint together with its declared lifetime.
#[derive(Clone, Debug)]
pub(crate) struct IssuedToken {
	pub(crate) access_token: TokenSecret,
	/// Declared `expires_in`, in seconds; zero when the provider omitted it.
	pub(crate) expires_in: i64,
}

pub(crate) trait OAuth2Facade {
	fn exchange_client_credentials<'a, 'scope>(
		&'a self,
		scope: &'scope ScopeSet,
	) -> FacadeFuture<'a, IssuedToken>
	where
		'scope: 'a;
}

pub(crate) struct BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	client_id: ClientId,
	endpoint: Url,
}
impl<C> BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	pub(crate) fn from_config(
		config: &ProviderConfig,
		client_id: ClientId,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let token_url = TokenUrl::new(config.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidTokenEndpoint { source })?;
		let mut oauth_client =
			BasicClient::new(OAuthClientId::new(client_id.to_string())).set_token_uri(token_url);

		if let Some(secret) = &config.client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
		}
		if matches!(config.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			http_client: http_client.into(),
			client_id,
			endpoint: config.token_endpoint.clone(),
		})
	}

	fn diagnostic(&self, status: Option<u16>, detail: impl Into<String>) -> TokenDiagnostic {
		TokenDiagnostic::new(self.client_id.clone(), self.endpoint.clone(), detail).with_status(status)
	}

	fn map_token_response(
		&self,
		status: Option<u16>,
		response: BasicTokenResponse,
	) -> Result<IssuedToken> {
		let access_token = TokenSecret::new(response.access_token().secret().to_owned());

		if access_token.is_blank() {
			return Err(Error::InvalidTokenResponse {
				diagnostic: Box::new(
					self.diagnostic(status, "Token endpoint returned a blank access token"),
				),
				source: None,
			});
		}

		let expires_in = response
			.expires_in()
			.map(|lifetime| i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX))
			.unwrap_or_default();

		Ok(IssuedToken { access_token, expires_in })
	}

	fn map_request_error<E>(
		&self,
		meta: Option<ResponseMetadata>,
		err: BasicRequestTokenError<HttpClientError<E>>,
	) -> Error
	where
		E: 'static + Send + Sync + StdError,
	{
		let status = meta.as_ref().and_then(|value| value.status);
		let body = meta.and_then(|value| value.body_preview);

		match err {
			RequestTokenError::ServerResponse(response) => {
				let detail = body.unwrap_or_else(|| describe_error_response(&response));

				Error::ProviderRejected { diagnostic: Box::new(self.diagnostic(status, detail)) }
			},
			RequestTokenError::Request(error) => {
				let diagnostic =
					self.diagnostic(status, error.to_string()).with_root_cause(&error);

				Error::TokenTransport { diagnostic: Box::new(diagnostic), source: Box::new(error) }
			},
			RequestTokenError::Parse(error, raw) => {
				let diagnostic =
					Box::new(self.diagnostic(status, body.unwrap_or_else(|| body_preview(&raw))));

				if is_rejection(status) {
					return Error::ProviderRejected { diagnostic };
				}

				let source: Box<dyn StdError + Send + Sync> = Box::new(error);

				Error::InvalidTokenResponse { diagnostic, source: Some(source) }
			},
			RequestTokenError::Other(message) => {
				let diagnostic = Box::new(self.diagnostic(status, body.unwrap_or(message)));

				if is_rejection(status) {
					Error::ProviderRejected { diagnostic }
				} else {
					Error::InvalidTokenResponse { diagnostic, source: None }
				}
			},
		}
	}
}
impl<C> OAuth2Facade for BasicFacade<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn exchange_client_credentials<'a, 'scope>(
		&'a self,
		scope: &'scope ScopeSet,
	) -> FacadeFuture<'a, IssuedToken>
	where
		'scope: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let mut request = self.oauth_client.exchange_client_credentials();

			for value in scope.iter() {
				request = request.add_scope(Scope::new(value.to_owned()));
			}

			let response = request
				.request_async(&instrumented)
				.await
				.map_err(|err| self.map_request_error(meta.take(), err))?;
			let status = meta.take().and_then(|value| value.status);

			self.map_token_response(status, response)
		})
	}
}

/// Only a 200 counts as success; anything else that slipped past the OAuth error parser is
/// still a provider rejection.
fn is_rejection(status: Option<u16>) -> bool {
	status.is_some_and(|code| code != 200)
}

fn describe_error_response(response: &BasicErrorResponse) -> String {
	serde_json::to_string(response).unwrap_or_else(|_| response.error().as_ref().to_owned())
}
