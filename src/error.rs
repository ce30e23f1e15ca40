//! Crate-level error types shared by the provider, transport, and outbound helpers.

// crates.io
use oauth2::http::header::InvalidHeaderValue;
// self
use crate::{_prelude::*, auth::ClientId};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Outbound transport failure raised after a token was attached.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Identity provider answered the token request with a non-success status.
	#[error("{diagnostic}")]
	ProviderRejected {
		/// Context describing the rejected request.
		diagnostic: Box<TokenDiagnostic>,
	},
	/// Token endpoint could not be reached.
	#[error("{diagnostic}")]
	TokenTransport {
		/// Context describing the failed request, including the root cause.
		diagnostic: Box<TokenDiagnostic>,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// Token endpoint answered with success but the payload is unusable.
	#[error("{diagnostic}")]
	InvalidTokenResponse {
		/// Context describing the malformed response.
		diagnostic: Box<TokenDiagnostic>,
		/// Structured parsing failure, when one occurred.
		#[source]
		source: Option<BoxError>,
	},
	/// A call site that must always send a bearer header could not obtain one.
	#[error("Authorization headers could not be retrieved.")]
	AuthorizationUnavailable {
		/// Failure that prevented the token from being produced.
		#[source]
		source: Box<Error>,
	},
	/// Blank access tokens cannot be attached to a request.
	#[error("Access token is blank.")]
	BlankToken,
	/// Access token contains bytes that cannot appear in an HTTP header.
	#[error("Access token cannot be encoded as an HTTP header value.")]
	InvalidHeaderValue(#[from] InvalidHeaderValue),
	/// Outbound request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Serialization(#[from] serde_json::Error),
}
impl Error {
	/// Returns the token diagnostic attached to provider-facing failures.
	pub fn diagnostic(&self) -> Option<&TokenDiagnostic> {
		match self {
			Self::ProviderRejected { diagnostic }
			| Self::TokenTransport { diagnostic, .. }
			| Self::InvalidTokenResponse { diagnostic, .. } => Some(diagnostic.as_ref()),
			Self::AuthorizationUnavailable { source } => source.diagnostic(),
			_ => None,
		}
	}

	/// Wraps any failure into the header-injection contract violation.
	pub fn authorization_unavailable(source: Error) -> Self {
		match source {
			already @ Self::AuthorizationUnavailable { .. } => already,
			other => Self::AuthorizationUnavailable { source: Box::new(other) },
		}
	}
}

/// Everything needed to diagnose a failed token request from logs alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDiagnostic {
	/// Client identifier presented to the provider.
	pub client_id: ClientId,
	/// Token endpoint that was called.
	pub endpoint: Url,
	/// HTTP status code returned by the provider, when a response arrived.
	pub status: Option<u16>,
	/// Response body or error message.
	pub detail: String,
	/// Deepest error message in the transport failure chain.
	pub root_cause: Option<String>,
}
impl TokenDiagnostic {
	/// Creates a diagnostic for the provided client + endpoint pair.
	pub fn new(client_id: ClientId, endpoint: Url, detail: impl Into<String>) -> Self {
		Self { client_id, endpoint, status: None, detail: detail.into(), root_cause: None }
	}

	/// Records the HTTP status code.
	pub fn with_status(mut self, status: Option<u16>) -> Self {
		self.status = status;

		self
	}

	/// Records the root-cause message of a transport failure chain.
	pub fn with_root_cause(mut self, error: &(dyn StdError + 'static)) -> Self {
		self.root_cause = Some(root_cause(error));

		self
	}
}
impl Display for TokenDiagnostic {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(
			f,
			"Unable to retrieve token for client {} from provider '{}'",
			self.client_id, self.endpoint
		)?;

		if let Some(status) = self.status {
			write!(f, " (HTTP {status})")?;
		}

		write!(f, ". Error: '{}'", self.detail)?;

		if let Some(cause) = &self.root_cause {
			write!(f, ", root cause: {cause}")?;
		}

		f.write_str(".")
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Configured token endpoint cannot be used by the OAuth client.
	#[error("Token endpoint is invalid.")]
	InvalidTokenEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Provider configuration failed validation.
	#[error(transparent)]
	Provider(#[from] crate::provider::ProviderConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures raised by the outbound helpers.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while sending the authorized request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Walks an error's source chain and returns the innermost message.
pub fn root_cause(error: &(dyn StdError + 'static)) -> String {
	let mut current = error;

	while let Some(next) = current.source() {
		current = next;
	}

	current.to_string()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::IdentityId;

	fn diagnostic() -> TokenDiagnostic {
		let identity = IdentityId::new("Tenant-42").expect("Identity fixture should be valid.");
		let client_id = ClientId::derive(Some("svc"), &identity);
		let endpoint =
			Url::parse("https://idp.example.com/connect/token").expect("Endpoint should parse.");

		TokenDiagnostic::new(client_id, endpoint, "invalid_client")
	}

	#[derive(Debug, ThisError)]
	#[error("connection reset")]
	struct Reset;

	#[derive(Debug, ThisError)]
	#[error("request failed")]
	struct Outer(#[source] Reset);

	#[test]
	fn diagnostic_message_names_client_endpoint_and_body() {
		let message = diagnostic().with_status(Some(401)).to_string();

		assert_eq!(
			message,
			"Unable to retrieve token for client svc.tenant-42 from provider \
			 'https://idp.example.com/connect/token' (HTTP 401). Error: 'invalid_client'."
		);
	}

	#[test]
	fn root_cause_reaches_innermost_error() {
		let outer = Outer(Reset);

		assert_eq!(root_cause(&outer), "connection reset");

		let message = diagnostic().with_root_cause(&outer).to_string();

		assert!(message.ends_with(", root cause: connection reset."));
	}

	#[test]
	fn authorization_unavailable_keeps_the_cause() {
		let rejected = Error::ProviderRejected { diagnostic: Box::new(diagnostic()) };
		let err = Error::authorization_unavailable(rejected);

		assert_eq!(err.to_string(), "Authorization headers could not be retrieved.");
		assert_eq!(
			err.diagnostic().map(|d| d.detail.as_str()),
			Some("invalid_client"),
			"Diagnostic should stay reachable through the contract violation."
		);

		let source = StdError::source(&err).expect("Contract violation should expose a source.");

		assert!(source.to_string().contains("svc.tenant-42"));

		let rewrapped = Error::authorization_unavailable(err);

		match rewrapped {
			Error::AuthorizationUnavailable { source } =>
				assert!(matches!(*source, Error::ProviderRejected { .. })),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
