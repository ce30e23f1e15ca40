//! Token secrets and the cached token entries handed out by [`TokenCache`](crate::cache::TokenCache).

pub mod cached;
pub mod secret;
