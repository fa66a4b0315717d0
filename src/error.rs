//! Error types for sitemap extraction.
//!
//! Failures fall in two groups. Per-sitemap failures ([`FetchError`],
//! [`SitemapError`]) are recorded in the run report and never stop a run.
//! Fatal failures ([`ExtractError`]) stop a run before or while it starts,
//! and [`OutputError`] covers the output sink.

use serde::Serialize;
use thiserror::Error;

use crate::parsers::xml::XmlError;

/// Retrieval failure for a single sitemap URL.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, connect, timeout, body read).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status and the body was not usable.
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn transport(url: &str, error: impl std::fmt::Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Failure to process one sitemap document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SitemapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The body is not well-formed XML.
    #[error("Parsing error: is this a valid XML sitemap? ({0})")]
    MalformedXml(String),

    /// Anything else that went wrong while reading a parsed document.
    #[error("{0}")]
    Processing(String),
}

impl SitemapError {
    /// Short label used in log lines and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            SitemapError::Fetch(FetchError::Transport { .. }) => "transport",
            SitemapError::Fetch(FetchError::Status { .. }) => "http-status",
            SitemapError::MalformedXml(_) => "malformed-xml",
            SitemapError::Processing(_) => "processing",
        }
    }
}

impl From<XmlError> for SitemapError {
    fn from(error: XmlError) -> Self {
        match error {
            XmlError::Malformed(detail) => SitemapError::MalformedXml(detail),
            XmlError::Namespace(detail) | XmlError::Other(detail) => {
                SitemapError::Processing(detail)
            }
        }
    }
}

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid seed URL `{url}`: {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("seed sitemap is unreachable: {0}")]
    UnreachableSeed(#[source] FetchError),

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("invalid page filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("extraction did not finish within {0} seconds")]
    TimedOut(u64),
}

/// Errors raised while writing extracted pages.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
