//! Request signing contracts that attach provider-issued tokens to HTTP requests.

// crates.io
use oauth2::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Attaches an `Authorization: Bearer <token>` header to an outbound request.
///
/// Any existing `Authorization` header is replaced, never duplicated. Blank tokens are
/// rejected instead of producing an empty credential.
pub trait RequestSigner {
	/// Sets the bearer authorization header from `token`.
	fn attach_bearer(&mut self, token: &TokenSecret) -> Result<()>;
}
impl RequestSigner for HeaderMap {
	fn attach_bearer(&mut self, token: &TokenSecret) -> Result<()> {
		self.insert(AUTHORIZATION, bearer_header_value(token)?);

		Ok(())
	}
}
#[cfg(feature = "reqwest")]
impl RequestSigner for reqwest::Request {
	fn attach_bearer(&mut self, token: &TokenSecret) -> Result<()> {
		self.headers_mut().attach_bearer(token)
	}
}

/// Builds a sensitive `Bearer <token>` header value.
pub fn bearer_header_value(token: &TokenSecret) -> Result<HeaderValue> {
	if token.is_blank() {
		return Err(Error::BlankToken);
	}

	let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))?;

	value.set_sensitive(true);

	Ok(value)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn attach_replaces_existing_authorization() {
		let mut headers = HeaderMap::new();

		headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic c3RhbGU="));
		headers
			.attach_bearer(&TokenSecret::new("abc123"))
			.expect("Valid tokens should be attached.");

		let values = headers.get_all(AUTHORIZATION).iter().collect::<Vec<_>>();

		assert_eq!(values.len(), 1, "Authorization must not be duplicated.");
		assert_eq!(values[0], "Bearer abc123");
		assert!(values[0].is_sensitive());
	}

	#[test]
	fn blank_and_malformed_tokens_are_rejected() {
		let mut headers = HeaderMap::new();

		assert!(matches!(headers.attach_bearer(&TokenSecret::new(" ")), Err(Error::BlankToken)));
		assert!(matches!(
			headers.attach_bearer(&TokenSecret::new("abc\n123")),
			Err(Error::InvalidHeaderValue(_))
		));
		assert!(headers.is_empty(), "Failed attachments must leave headers untouched.");
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn reqwest_requests_can_be_signed() {
		let url = Url::parse("https://api.example.com/orders").expect("URL fixture should parse.");
		let mut request = reqwest::Request::new(reqwest::Method::GET, url);

		request
			.attach_bearer(&TokenSecret::new("abc123"))
			.expect("Valid tokens should be attached.");

		assert_eq!(
			request.headers().get(AUTHORIZATION).map(|value| value.as_bytes()),
			Some(b"Bearer abc123".as_slice())
		);
	}
}
