use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for a sitemap extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Sitemap or sitemap index URL to start from
    #[serde(default)]
    pub start_url: String,

    /// Maximum number of concurrent fetches per stage
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Maximum number of concurrent fetches to one host
    #[serde(default = "default_per_host_limit")]
    pub per_host_limit: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for the whole run in seconds (no limit if unset)
    #[serde(default)]
    pub total_timeout_secs: Option<u64>,

    /// Maximum number of redirects followed per request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Treat non-2xx responses as failures without reading the body
    #[serde(default)]
    pub fail_on_http_error: bool,

    /// Drop repeated page URLs, keeping the first occurrence
    #[serde(default = "default_dedupe_pages")]
    pub dedupe_pages: bool,

    /// Label written next to every page URL
    #[serde(default)]
    pub custom_label: Option<String>,

    /// Only keep pages on the seed's host
    #[serde(default)]
    pub same_domain_only: bool,

    /// Regex patterns for page URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for page URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    4
}

/// Default value for per_host_limit
fn default_per_host_limit() -> usize {
    2
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    concat!("sitemap-extract/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_dedupe_pages() -> bool {
    true
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl ExtractorConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_concurrency: default_max_concurrency(),
            per_host_limit: default_per_host_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            total_timeout_secs: None,
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            fail_on_http_error: false,
            dedupe_pages: default_dedupe_pages(),
            custom_label: None,
            same_domain_only: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Reject settings that cannot drive a run
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.max_concurrency == 0 {
            return Err(ExtractError::InvalidSetting(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.per_host_limit == 0 {
            return Err(ExtractError::InvalidSetting(
                "per_host_limit must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ExtractError::InvalidSetting(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.total_timeout_secs == Some(0) {
            return Err(ExtractError::InvalidSetting(
                "total_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
