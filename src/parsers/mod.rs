pub mod xml;


use crate::crawlers::FetchedDocument;
use crate::error::{FetchError, SitemapError};
use xml::XmlElement;

/// Root child naming a page in a URL-set document.
pub const URL_ENTRY: &str = "url";
/// Root child naming another sitemap in an index document.
pub const SITEMAP_ENTRY: &str = "sitemap";
/// Entry child holding the location text.
pub const LOC: &str = "loc";

/// A parsed sitemap, classified by the children of its root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Sitemap index: locations of child sitemaps, in document order
    Index(Vec<String>),
    /// URL set: page locations, in document order
    UrlSet(Vec<String>),
    /// Neither `url` nor `sitemap` children under the root's namespace
    Unknown {
        /// Local name of the root element
        root: String,
    },
}

impl SitemapDocument {
    /// Classifies a root element.
    ///
    /// Children are only matched in the namespace the root element itself
    /// declares. A root with any `url` child is a URL set even if it also has
    /// `sitemap` children.
    pub fn classify(root: &XmlElement) -> Result<Self, SitemapError> {
        let namespace = root.namespace();

        if root.has_child(namespace, URL_ENTRY) {
            if root.has_child(namespace, SITEMAP_ENTRY) {
                ::log::debug!(
                    "<{}> mixes <url> and <sitemap> entries, reading it as a URL set",
                    root.name
                );
            }
            return collect_locs(root, URL_ENTRY).map(SitemapDocument::UrlSet);
        }

        if root.has_child(namespace, SITEMAP_ENTRY) {
            return collect_locs(root, SITEMAP_ENTRY).map(SitemapDocument::Index);
        }

        Ok(SitemapDocument::Unknown {
            root: root.name.clone(),
        })
    }

    /// Child sitemap locations, empty unless this is an index
    pub fn sitemap_locs(&self) -> &[String] {
        match self {
            SitemapDocument::Index(locs) => locs,
            _ => &[],
        }
    }

    /// Page locations, empty unless this is a URL set
    pub fn page_locs(&self) -> &[String] {
        match self {
            SitemapDocument::UrlSet(locs) => locs,
            _ => &[],
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, SitemapDocument::Index(_))
    }
}

fn collect_locs(root: &XmlElement, entry: &str) -> Result<Vec<String>, SitemapError> {
    let namespace = root.namespace();
    root.children(namespace, entry)
        .enumerate()
        .map(|(position, element)| {
            element
                .child(namespace, LOC)
                .map(|loc| loc.text().to_string())
                .ok_or_else(|| {
                    SitemapError::Processing(format!(
                        "<{}> entry #{} has no <{}> child",
                        entry,
                        position + 1,
                        LOC
                    ))
                })
        })
        .collect()
}

/// Entry point for turning raw bodies into classified documents
pub struct Parser;

impl Parser {
    /// Parse and classify a raw XML body
    pub fn parse(content: &[u8]) -> Result<SitemapDocument, SitemapError> {
        let root = xml::parse_document(content)?;
        SitemapDocument::classify(&root)
    }

    /// Parse a fetched response, applying the HTTP status policy.
    ///
    /// With `fail_on_http_error` a non-success status is an error before the
    /// body is looked at. Otherwise the body is parsed regardless of status;
    /// an error body that parses but holds no sitemap entries is reported as a
    /// status failure.
    pub fn parse_response(
        document: &FetchedDocument,
        fail_on_http_error: bool,
    ) -> Result<SitemapDocument, SitemapError> {
        let status_error = || {
            SitemapError::Fetch(FetchError::Status {
                url: document.url.clone(),
                status: document.status,
            })
        };

        if document.is_success() {
            return Self::parse(&document.body);
        }

        if fail_on_http_error {
            return Err(status_error());
        }

        match Self::parse(&document.body)? {
            SitemapDocument::Unknown { .. } => Err(status_error()),
            parsed => {
                ::log::warn!(
                    "Using sitemap body from {} despite HTTP {}",
                    document.url,
                    document.status
                );
                Ok(parsed)
            }
        }
    }
}
