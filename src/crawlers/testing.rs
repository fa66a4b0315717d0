//! In-memory fetcher for exercising the stages without a network.

use crate::crawlers::crawler::{FetchedDocument, Fetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, (u16, String)>,
    redirects: HashMap<String, String>,
    unreachable: Vec<String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `url`
    pub fn with(self, url: &str, body: &str) -> Self {
        self.with_status(url, 200, body)
    }

    pub fn with_status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    /// Serve the response of `target` when `url` is requested
    pub fn with_redirect(mut self, url: &str, target: &str) -> Self {
        self.redirects.insert(url.to_string(), target.to_string());
        self
    }

    /// Fail requests to `url` with a transport error
    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.push(url.to_string());
        self
    }

    /// Every URL requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        if self.unreachable.iter().any(|u| u == url) {
            return Err(FetchError::transport(url, "connection refused"));
        }

        let final_url = self.redirects.get(url).map_or(url, String::as_str);
        let mut document = match self.responses.get(final_url) {
            Some((status, body)) => FetchedDocument::new(url, *status, body.as_bytes()),
            None => FetchedDocument::new(url, 404, "Not Found"),
        };
        document.final_url = final_url.to_string();
        Ok(document)
    }
}

/// A `<urlset>` listing the given page locations
pub fn urlset(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{loc}</loc></url>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</urlset>"#
    )
}

/// A `<sitemapindex>` listing the given sitemap locations
pub fn sitemap_index(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{loc}</loc></sitemap>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{entries}</sitemapindex>"#
    )
}
