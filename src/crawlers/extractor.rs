//! Page location extraction from resolved sitemaps.

use crate::config::ExtractorConfig;
use crate::crawlers::crawler::{FetchedDocument, Fetcher};
use crate::error::{FetchError, SitemapError};
use crate::parsers::Parser;
use crate::results::SitemapFailure;
use futures::stream::{self, StreamExt};

/// Outcome of the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Page URLs in sitemap order, then document order
    pub pages: Vec<String>,
    /// Sitemaps whose pages could not be read
    pub failures: Vec<SitemapFailure>,
    /// Number of sitemap bodies retrieved
    pub contents_fetched: usize,
}

/// Extract the `<loc>` of every `<url>` entry in a raw sitemap body.
///
/// Index documents and documents without `url` entries yield nothing.
pub fn extract_locs(content: &[u8]) -> Result<Vec<String>, SitemapError> {
    Parser::parse(content).map(|document| document.page_locs().to_vec())
}

/// Fetch the body of every sitemap, keeping the order of `sitemaps`
/// regardless of completion order.
pub async fn fetch_contents<F: Fetcher + ?Sized>(
    fetcher: &F,
    sitemaps: &[String],
    max_concurrency: usize,
) -> Vec<Result<FetchedDocument, FetchError>> {
    stream::iter(sitemaps)
        .map(|url| fetcher.fetch(url))
        .buffered(max_concurrency.max(1))
        .collect::<Vec<_>>()
        .await
}

/// Fetch every sitemap, then extract and concatenate their page locations.
pub async fn extract_all<F: Fetcher + ?Sized>(
    fetcher: &F,
    sitemaps: &[String],
    config: &ExtractorConfig,
) -> Extraction {
    let contents = fetch_contents(fetcher, sitemaps, config.max_concurrency).await;

    let mut extraction = Extraction {
        contents_fetched: contents.iter().filter(|c| c.is_ok()).count(),
        ..Extraction::default()
    };
    ::log::info!(
        "Fetched {} of {} sitemap bodies",
        extraction.contents_fetched,
        sitemaps.len()
    );

    for (url, content) in sitemaps.iter().zip(contents) {
        let outcome = content
            .map_err(SitemapError::from)
            .and_then(|fetched| Parser::parse_response(&fetched, config.fail_on_http_error));

        match outcome {
            Ok(document) => {
                let pages = document.page_locs();
                ::log::debug!("Extracted {} page URLs from {}", pages.len(), url);
                extraction.pages.extend_from_slice(pages);
            }
            Err(error) => {
                ::log::warn!("Failed to extract pages from {}: {}", url, error);
                extraction.failures.push(SitemapFailure::new(url, error));
            }
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::testing::{StaticFetcher, sitemap_index, urlset};

    fn config() -> ExtractorConfig {
        ExtractorConfig::new("https://example.com/sitemap.xml")
    }

    #[test]
    fn test_extract_locs_in_document_order() {
        let body = urlset(&[
            "https://example.com/c",
            "https://example.com/a",
            "https://example.com/b",
        ]);

        let locs = extract_locs(body.as_bytes()).unwrap();

        assert_eq!(
            locs,
            vec![
                "https://example.com/c",
                "https://example.com/a",
                "https://example.com/b"
            ]
        );
    }

    #[test]
    fn test_extract_locs_ignores_index_documents() {
        let body = sitemap_index(&["https://example.com/s1.xml"]);
        assert!(extract_locs(body.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_extract_locs_empty_document() {
        let body = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"/>"#;
        assert!(extract_locs(body.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_extract_locs_malformed() {
        let body = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/a</loc>"#;
        let result = extract_locs(body.as_bytes());
        assert!(matches!(result, Err(SitemapError::MalformedXml(_))));
    }

    #[tokio::test]
    async fn test_concatenates_in_sitemap_order() {
        let first: Vec<String> = (1..=3).map(|i| format!("https://example.com/a{i}")).collect();
        let second: Vec<String> = (1..=5).map(|i| format!("https://example.com/b{i}")).collect();
        let first_refs: Vec<&str> = first.iter().map(String::as_str).collect();
        let second_refs: Vec<&str> = second.iter().map(String::as_str).collect();

        let fetcher = StaticFetcher::new()
            .with(
                "https://example.com/sitemap.xml",
                &sitemap_index(&["https://example.com/1.xml", "https://example.com/2.xml"]),
            )
            .with("https://example.com/1.xml", &urlset(&first_refs))
            .with("https://example.com/2.xml", &urlset(&second_refs));

        let sitemaps = vec![
            "https://example.com/sitemap.xml".to_string(),
            "https://example.com/1.xml".to_string(),
            "https://example.com/2.xml".to_string(),
        ];
        let extraction = extract_all(&fetcher, &sitemaps, &config()).await;

        assert_eq!(extraction.pages.len(), 8);
        assert_eq!(&extraction.pages[..3], first.as_slice());
        assert_eq!(&extraction.pages[3..], second.as_slice());
        assert_eq!(extraction.contents_fetched, 3);
        assert!(extraction.failures.is_empty());
    }

    #[tokio::test]
    async fn test_keeps_pages_when_a_later_sitemap_fails() {
        let fetcher = StaticFetcher::new()
            .with("https://example.com/1.xml", &urlset(&["https://example.com/a"]))
            .with("https://example.com/2.xml", "<urlset><url>")
            .unreachable("https://example.com/3.xml");

        let sitemaps = vec![
            "https://example.com/1.xml".to_string(),
            "https://example.com/2.xml".to_string(),
            "https://example.com/3.xml".to_string(),
        ];
        let extraction = extract_all(&fetcher, &sitemaps, &config()).await;

        assert_eq!(extraction.pages, vec!["https://example.com/a"]);
        assert_eq!(extraction.contents_fetched, 2);
        assert_eq!(extraction.failures.len(), 2);
        assert!(matches!(
            extraction.failures[0].error,
            SitemapError::MalformedXml(_)
        ));
        assert!(matches!(
            extraction.failures[1].error,
            SitemapError::Fetch(FetchError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_error_status_body_fails_gracefully() {
        let fetcher = StaticFetcher::new()
            .with_status("https://example.com/gone.xml", 404, "<html><body>Not Found</body></html>")
            .with_status("https://example.com/plain.xml", 500, "Internal Server Error");

        let sitemaps = vec![
            "https://example.com/gone.xml".to_string(),
            "https://example.com/plain.xml".to_string(),
        ];
        let extraction = extract_all(&fetcher, &sitemaps, &config()).await;

        assert!(extraction.pages.is_empty());
        assert!(matches!(
            extraction.failures[0].error,
            SitemapError::Fetch(FetchError::Status { status: 404, .. })
        ));
        assert!(matches!(
            extraction.failures[1].error,
            SitemapError::MalformedXml(_)
        ));
    }
}
