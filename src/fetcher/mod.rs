pub mod http;

use async_trait::async_trait;

use crate::app::Result;

pub use http::HttpFetcher;

/// Byte-accurate feed retrieval. Returns raw bytes, never pre-decoded text:
/// the charset is unknown until the document is inspected.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
