//! Network access for the cache manager.
//!
//! The manager only ever talks to the network through the `Network`
//! trait, so hosts can plug in a real HTTP client (`HttpNetwork`) or a
//! scripted one in tests.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::models::{Request, Response};

pub use client::HttpNetwork;
pub use error::NetworkError;

#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. Any HTTP status is a successful fetch; only
    /// transport failures are errors.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}
