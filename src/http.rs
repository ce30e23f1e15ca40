//! Transport primitives for token endpoint calls.
//!
//! The module exposes [`TokenHttpClient`] alongside [`ResponseMetadata`] and
//! [`ResponseMetadataSlot`] so downstream crates can plug in their own HTTP stack while
//! keeping the diagnostics the provider logs on failure. Implementations call
//! [`ResponseMetadataSlot::take`] before dispatching a request and
//! [`ResponseMetadataSlot::store`] once an HTTP status (and, for failures, the body) is
//! known.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
#[cfg(feature = "reqwest")] use reqwest::redirect::Policy;
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of executing token requests while publishing
/// response metadata for diagnostics.
///
/// The trait is the provider's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared by every caller, and the handles
/// they return must own whatever state is required so their request futures remain
/// `Send` for the lifetime of the in-flight call. Dropping that future must abort the
/// request.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request so stale
	///   information never leaks across attempts.
	/// - Once a response arrives, save its status with [`ResponseMetadataSlot::store`]; for
	///   non-success statuses include a body preview.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for error reporting.
///
/// Additional fields may be added in future releases, so construct values using field
/// names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
	/// Truncated response body for non-success statuses.
	pub body_preview: Option<String>,
}
impl ResponseMetadata {
	const BODY_PREVIEW_LIMIT: usize = 1024;

	/// Captures the status and, unless the status is 2xx, a preview of `body`.
	pub fn from_response(status: u16, body: &[u8]) -> Self {
		let body_preview = (!(200..300).contains(&status)).then(|| body_preview(body));

		Self { status: Some(status), body_preview }
	}
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The provider creates a fresh slot for each token request and reads the captured
/// metadata as soon as the request resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] used for token endpoint calls.
///
/// Token endpoints answer directly, so [`ReqwestHttpClient::build`] disables redirect
/// following. Configure any custom [`ReqwestClient`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects and aborts after `timeout`.
	pub fn build(timeout: Option<std::time::Duration>) -> Result<Self, crate::error::ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(Policy::none());

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}

	pub(crate) fn instrumented(&self, slot: ResponseMetadataSlot) -> InstrumentedHandle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`TokenHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: ResponseMetadataSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(Box::new)?.to_vec();

			client.slot.store(ResponseMetadata::from_response(status.as_u16(), &body));

			let mut response_new = HttpResponse::new(body);

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		self.instrumented(slot)
	}
}

/// Lossy UTF-8 preview of a response body, truncated with an ellipsis.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let limit = ResponseMetadata::BODY_PREVIEW_LIMIT;

	if text.chars().count() <= limit {
		return text.trim().to_owned();
	}

	let mut buf = text.chars().take(limit).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn metadata_keeps_body_only_for_failures() {
		let ok = ResponseMetadata::from_response(200, b"{\"access_token\":\"abc123\"}");
		let rejected = ResponseMetadata::from_response(401, b"invalid_client\n");

		assert_eq!(ok, ResponseMetadata { status: Some(200), body_preview: None });
		assert_eq!(rejected.status, Some(401));
		assert_eq!(rejected.body_preview.as_deref(), Some("invalid_client"));
	}

	#[test]
	fn long_bodies_are_truncated() {
		let body = "x".repeat(ResponseMetadata::BODY_PREVIEW_LIMIT + 10);
		let preview = body_preview(body.as_bytes());

		assert_eq!(preview.chars().count(), ResponseMetadata::BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}

	#[test]
	fn slot_take_clears_metadata() {
		let slot = ResponseMetadataSlot::default();

		slot.store(ResponseMetadata { status: Some(500), body_preview: Some("boom".into()) });

		assert_eq!(slot.take().and_then(|meta| meta.status), Some(500));
		assert!(slot.take().is_none());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_client_builds_with_timeout() {
		let client = ReqwestHttpClient::build(Some(std::time::Duration::from_secs(5)));

		assert!(client.is_ok());
	}
}
