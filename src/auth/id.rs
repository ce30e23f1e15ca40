//! Strongly typed identifiers for calling identities and the OAuth clients derived from them.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (identity, client).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (identity, client).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (identity, client).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
}

def_id! { IdentityId, "Unique identifier of the tenant or service a token is requested for.", "Identity" }
def_id! { ClientId, "OAuth 2.0 client identifier presented to the token endpoint.", "Client" }

impl ClientId {
	/// Derives the client identifier for an identity: `{prefix}.{identity}`, lower-cased.
	///
	/// Without a prefix the lower-cased identity is used on its own. Both inputs are
	/// already validated, so the result is built without re-checking its length.
	pub fn derive(prefix: Option<&str>, identity: &IdentityId) -> Self {
		let raw = match prefix.filter(|value| !value.is_empty()) {
			Some(prefix) => format!("{prefix}.{identity}"),
			None => identity.to_string(),
		};

		Self(raw.to_lowercase())
	}
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_reject_padding_and_empty_values() {
		assert!(IdentityId::new(" tenant-123").is_err(), "Leading whitespace must be rejected.");
		assert!(IdentityId::new("tenant-123 ").is_err(), "Trailing whitespace must be rejected.");

		let identity =
			IdentityId::new("tenant-123").expect("Identity fixture should be considered valid.");

		assert_eq!(identity.as_ref(), "tenant-123");
		assert!(IdentityId::new("").is_err());
		assert!(ClientId::new("with space").is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let payload = "\"3F2504E0-4F89-11D3-9A0C-0305E82C3301\"";
		let identity: IdentityId =
			serde_json::from_str(payload).expect("Identity should deserialize successfully.");

		assert_eq!(identity.as_ref(), "3F2504E0-4F89-11D3-9A0C-0305E82C3301");
		assert!(serde_json::from_str::<IdentityId>("\"with space\"").is_err());
	}

	#[test]
	fn unicode_whitespace_and_length_limits() {
		let nbsp = format!("tenant{}id", '\u{00A0}');

		assert!(IdentityId::new(&nbsp).is_err());

		let exact = "a".repeat(IDENTIFIER_MAX_LEN);

		IdentityId::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(IDENTIFIER_MAX_LEN + 1);

		assert!(IdentityId::new(&too_long).is_err());
	}

	#[test]
	fn client_id_joins_prefix_and_lowercases() {
		let identity = IdentityId::new("3F2504E0-4F89-11D3-9A0C-0305E82C3301")
			.expect("Identity fixture should be valid.");

		assert_eq!(
			ClientId::derive(Some("Orders.Api"), &identity).as_ref(),
			"orders.api.3f2504e0-4f89-11d3-9a0c-0305e82c3301"
		);
		assert_eq!(
			ClientId::derive(None, &identity).as_ref(),
			"3f2504e0-4f89-11d3-9a0c-0305e82c3301"
		);
		assert_eq!(
			ClientId::derive(Some(""), &identity),
			ClientId::derive(None, &identity),
			"An empty prefix behaves like no prefix."
		);
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<IdentityId, u8> = HashMap::from_iter([(
			IdentityId::new("tenant-123").expect("Identity used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("tenant-123"), Some(&7));
	}
}
