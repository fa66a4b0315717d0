use crate::error::FetchError;
use async_trait::async_trait;

/// Raw response for one sitemap URL.
///
/// Non-success responses are still returned as documents: the status and
/// error body are data for the caller to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// URL that was requested
    pub url: String,
    /// URL the response came from after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Undecoded body bytes
    pub body: Vec<u8>,
}

impl FetchedDocument {
    /// Create a document whose final URL is the requested one
    pub fn new(url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.to_string(),
            final_url: url.to_string(),
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// Define a base trait for fetchers
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the body at `url`.
    ///
    /// Only transport failures are errors; HTTP error statuses are returned
    /// as documents.
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        (**self).fetch(url).await
    }
}
