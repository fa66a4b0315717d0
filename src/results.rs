use crate::error::SitemapError;
use serde::{Deserialize, Serialize};

/// One output row: a discovered page and its optional label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL of the page
    pub page_url: String,

    /// Label written next to the URL (if configured)
    pub custom_label: Option<String>,
}

impl PageRecord {
    /// Create a new page record
    pub fn new(page_url: String, custom_label: Option<String>) -> Self {
        Self {
            page_url,
            custom_label,
        }
    }
}

/// A sitemap that could not be processed, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapFailure {
    pub url: String,
    pub error: SitemapError,
}

impl SitemapFailure {
    pub fn new(url: &str, error: SitemapError) -> Self {
        Self {
            url: url.to_string(),
            error,
        }
    }
}

/// Progress counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Sitemaps queued by the resolver, seed included
    pub sitemaps_queued: usize,
    /// Child sitemap locations skipped because they were already queued
    pub revisits_skipped: usize,
    /// Sitemap bodies retrieved by the extraction stage
    pub contents_fetched: usize,
    /// Page locations read from all sitemaps
    pub urls_extracted: usize,
    /// Repeated page URLs dropped
    pub duplicate_pages: usize,
    /// Page URLs rejected by the page filter
    pub filtered_pages: usize,
    /// Rows in the final output
    pub pages_written: usize,
    /// Distinct sitemaps with at least one failure
    pub failed_sitemaps: usize,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub seed: String,
    /// Resolved sitemap URLs in traversal order
    pub sitemaps: Vec<String>,
    /// Output rows in extraction order
    pub pages: Vec<PageRecord>,
    /// Failures from both stages, resolution first
    pub failures: Vec<SitemapFailure>,
    pub stats: ExtractionStats,
}

impl ExtractionReport {
    /// Page URLs without labels
    pub fn page_urls(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.page_url.as_str()).collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
