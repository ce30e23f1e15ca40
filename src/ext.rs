//! Extension contracts for attaching bearer tokens to outbound requests.
//!
//! [`RequestSigner`] is implemented for header maps and, with the `reqwest` feature, for
//! reqwest requests, so any HTTP stack that exposes its headers can carry provider-issued
//! tokens.

pub mod request_signer;

pub use request_signer::*;
