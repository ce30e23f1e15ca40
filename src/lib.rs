//! Client-credentials bearer tokens for outbound service calls.
//!
//! A [`provider::TokenProvider`] fetches tokens from an OAuth 2.0 token endpoint, keeps them
//! in a [`cache::TokenCache`] for a safety share of their declared lifetime, and hands them
//! out as `Authorization: Bearer` headers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
#[cfg(feature = "reqwest")] pub mod client;
pub mod error;
pub mod ext;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)]
use {color_eyre as _, httpmock as _, tokio as _, tracing_subscriber as _};
