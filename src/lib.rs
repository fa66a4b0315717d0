// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod output;
pub mod parsers;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ExtractorConfig;
pub use crawlers::{FetchedDocument, Fetcher, HostThrottle, HttpFetcher};
pub use error::{ExtractError, FetchError, OutputError, SitemapError};
pub use output::OutputFormat;
pub use results::{ExtractionReport, ExtractionStats, PageRecord, SitemapFailure};

use std::path::Path;
use std::time::Duration;

/// Main builder for a sitemap extraction run
pub struct Sitemaps {
    config: ExtractorConfig,
}

impl Sitemaps {
    /// Create a new builder for the given seed sitemap URL
    pub fn new(seed: &str) -> Self {
        Self {
            config: ExtractorConfig::new(seed),
        }
    }

    /// Create a builder from a complete configuration
    pub fn from_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a file, keeping the current seed if the file has none
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let config = ExtractorConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string, keeping the current seed if it has none
    pub fn with_config_str(self, config_str: &str) -> Result<Self, ExtractError> {
        let config = ExtractorConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    fn with_config(mut self, mut config: ExtractorConfig) -> Self {
        if config.start_url.is_empty() {
            config.start_url = std::mem::take(&mut self.config.start_url);
        }
        self.config = config;
        self
    }

    /// Set the seed sitemap URL, replacing any loaded from configuration
    pub fn with_start_url(mut self, seed: &str) -> Self {
        self.config.start_url = seed.to_string();
        self
    }

    /// Set the maximum number of concurrent fetches per stage
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the maximum number of concurrent fetches to one host
    pub fn with_per_host_limit(mut self, per_host_limit: usize) -> Self {
        self.config.per_host_limit = per_host_limit;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.request_timeout_secs = timeout_seconds;
        self
    }

    /// Set the total timeout (maximum runtime)
    pub fn with_total_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.total_timeout_secs = Some(timeout_seconds);
        self
    }

    /// Label written next to every page URL
    pub fn with_custom_label(mut self, label: impl Into<String>) -> Self {
        self.config.custom_label = Some(label.into());
        self
    }

    /// Only keep page URLs matching at least one of these patterns
    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.include_patterns = patterns;
        self
    }

    /// Drop page URLs matching any of these patterns
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_patterns = patterns;
        self
    }

    /// Only keep pages on the seed's host
    pub fn same_domain_only(mut self, enabled: bool) -> Self {
        self.config.same_domain_only = enabled;
        self
    }

    /// Keep repeated page URLs instead of dropping them
    pub fn keep_duplicates(mut self, enabled: bool) -> Self {
        self.config.dedupe_pages = !enabled;
        self
    }

    /// Fail on non-2xx responses without reading their bodies
    pub fn fail_on_http_error(mut self, enabled: bool) -> Self {
        self.config.fail_on_http_error = enabled;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run the extraction over HTTP
    pub async fn run(self) -> Result<ExtractionReport, ExtractError> {
        self.config.validate()?;
        let fetcher = HostThrottle::new(
            HttpFetcher::new(&self.config)?,
            self.config.per_host_limit,
        );
        self.run_with(&fetcher).await
    }

    /// Run the extraction with a caller-supplied fetcher
    pub async fn run_with<F: Fetcher + ?Sized>(
        &self,
        fetcher: &F,
    ) -> Result<ExtractionReport, ExtractError> {
        let run = crawlers::pipeline::run(fetcher, &self.config);
        match self.config.total_timeout_secs {
            Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), run)
                .await
                .map_err(|_| ExtractError::TimedOut(seconds))?,
            None => run.await,
        }
    }
}
