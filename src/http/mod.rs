//! Transport seam: the request descriptor handed to a transport and the raw
//! response it returns.

mod client;
mod request;
mod response;

use anyhow::Result;
use async_trait::async_trait;

pub use client::HttpTransport;
pub use request::{Request, RequestBody};
pub use response::Response;

/// Sends one request and returns the raw response.
///
/// Any error returned here is treated as a transport failure by the
/// connectors: it is never inspected beyond logging.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}
