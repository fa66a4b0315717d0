//! Breadth-first resolution of sitemap indexes into the full list of sitemaps.

use crate::config::ExtractorConfig;
use crate::crawlers::crawler::Fetcher;
use crate::error::SitemapError;
use crate::parsers::Parser;
use crate::results::SitemapFailure;
use crate::utils::resolve_loc;
use futures::future::join_all;
use std::collections::{HashSet, VecDeque};

/// Outcome of the resolution stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Every sitemap URL enqueued, seed first, in enqueue order
    pub sitemaps: Vec<String>,
    /// Sitemaps that could not be fetched or parsed while resolving
    pub failures: Vec<SitemapFailure>,
    /// Child locations dropped because they were already enqueued
    pub revisits_skipped: usize,
}

/// Resolve `seed` into the ordered list of sitemap URLs reachable from it.
///
/// URLs are taken from the front of the queue in batches of up to
/// `max_concurrency` and fetched together. Outcomes are applied in queue
/// order and a URL leaves the queue only once its children are enqueued, so
/// the result matches one-at-a-time processing.
pub async fn resolve<F: Fetcher + ?Sized>(
    fetcher: &F,
    seed: &str,
    config: &ExtractorConfig,
) -> Resolution {
    let batch_size = config.max_concurrency.max(1);

    let mut resolution = Resolution::default();
    let mut queue: VecDeque<String> = VecDeque::new();
    let mut enqueued: HashSet<String> = HashSet::new();

    enqueued.insert(seed.to_string());
    queue.push_back(seed.to_string());
    resolution.sitemaps.push(seed.to_string());

    while !queue.is_empty() {
        let batch: Vec<String> = queue.iter().take(batch_size).cloned().collect();
        ::log::trace!("Resolving batch of {} sitemaps", batch.len());

        let outcomes = join_all(
            batch
                .iter()
                .map(|url| discover_children(fetcher, url, config.fail_on_http_error)),
        )
        .await;

        for (url, outcome) in batch.into_iter().zip(outcomes) {
            match outcome {
                Ok(children) => {
                    if !children.is_empty() {
                        ::log::info!("Found {} child sitemaps in {}", children.len(), url);
                    }
                    for child in children {
                        if !enqueued.insert(child.clone()) {
                            ::log::warn!(
                                "Skipping {} listed by {}: already queued",
                                child,
                                url
                            );
                            resolution.revisits_skipped += 1;
                            continue;
                        }
                        queue.push_back(child.clone());
                        resolution.sitemaps.push(child);
                    }
                }
                Err(error) => {
                    ::log::warn!("Failed to resolve {}: {}", url, error);
                    resolution.failures.push(SitemapFailure::new(&url, error));
                }
            }
            queue.pop_front();
        }
    }

    resolution
}

/// Fetch one sitemap and return the child sitemaps it lists.
///
/// URL sets and unrecognised documents have no children. Relative children
/// are joined onto the URL the document was served from after redirects.
async fn discover_children<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    fail_on_http_error: bool,
) -> Result<Vec<String>, SitemapError> {
    let fetched = fetcher.fetch(url).await?;
    let document = Parser::parse_response(&fetched, fail_on_http_error)?;

    if !document.is_index() {
        ::log::debug!("{} is a leaf sitemap", url);
    }

    Ok(document
        .sitemap_locs()
        .iter()
        .map(|loc| resolve_loc(&fetched.final_url, loc))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::testing::{StaticFetcher, sitemap_index, urlset};
    use crate::error::FetchError;

    const SEED: &str = "https://example.com/sitemap.xml";

    fn config() -> ExtractorConfig {
        ExtractorConfig::new(SEED)
    }

    #[tokio::test]
    async fn test_leaf_seed_resolves_to_itself() {
        let fetcher = StaticFetcher::new().with(SEED, &urlset(&["https://example.com/a"]));

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(resolution.sitemaps, vec![SEED]);
        assert!(resolution.failures.is_empty());
    }

    #[tokio::test]
    async fn test_index_children_in_document_order() {
        let children = [
            "https://example.com/s3.xml",
            "https://example.com/s1.xml",
            "https://example.com/s2.xml",
        ];
        let mut fetcher = StaticFetcher::new().with(SEED, &sitemap_index(&children));
        for child in children {
            fetcher = fetcher.with(child, &urlset(&[]));
        }

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(resolution.sitemaps.len(), 4);
        assert_eq!(resolution.sitemaps[0], SEED);
        assert_eq!(&resolution.sitemaps[1..], &children);
    }

    #[tokio::test]
    async fn test_nested_indexes_are_breadth_first() {
        let fetcher = StaticFetcher::new()
            .with(
                SEED,
                &sitemap_index(&["https://example.com/a.xml", "https://example.com/b.xml"]),
            )
            .with(
                "https://example.com/a.xml",
                &sitemap_index(&["https://example.com/a1.xml", "https://example.com/a2.xml"]),
            )
            .with(
                "https://example.com/b.xml",
                &sitemap_index(&["https://example.com/b1.xml"]),
            )
            .with("https://example.com/a1.xml", &urlset(&["https://example.com/p1"]))
            .with("https://example.com/a2.xml", &urlset(&["https://example.com/p2"]))
            .with("https://example.com/b1.xml", &urlset(&["https://example.com/p3"]));

        let expected = vec![
            SEED,
            "https://example.com/a.xml",
            "https://example.com/b.xml",
            "https://example.com/a1.xml",
            "https://example.com/a2.xml",
            "https://example.com/b1.xml",
        ];

        for concurrency in [1, 2, 8] {
            let mut config = config();
            config.max_concurrency = concurrency;
            let resolution = resolve(&fetcher, SEED, &config).await;
            assert_eq!(resolution.sitemaps, expected, "concurrency {concurrency}");
        }
    }

    #[tokio::test]
    async fn test_cyclic_indexes_terminate() {
        let fetcher = StaticFetcher::new()
            .with(SEED, &sitemap_index(&["https://example.com/loop.xml"]))
            .with(
                "https://example.com/loop.xml",
                &sitemap_index(&[SEED, "https://example.com/loop.xml"]),
            );

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(resolution.sitemaps, vec![SEED, "https://example.com/loop.xml"]);
        assert_eq!(resolution.revisits_skipped, 2);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_traversal() {
        let fetcher = StaticFetcher::new()
            .with(
                SEED,
                &sitemap_index(&[
                    "https://example.com/broken.xml",
                    "https://example.com/down.xml",
                    "https://example.com/ok.xml",
                ]),
            )
            .with("https://example.com/broken.xml", "<sitemapindex><sitemap>")
            .unreachable("https://example.com/down.xml")
            .with(
                "https://example.com/ok.xml",
                &sitemap_index(&["https://example.com/leaf.xml"]),
            )
            .with("https://example.com/leaf.xml", &urlset(&[]));

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(resolution.sitemaps.len(), 5);
        assert_eq!(resolution.sitemaps[4], "https://example.com/leaf.xml");
        assert_eq!(resolution.failures.len(), 2);
        assert_eq!(resolution.failures[0].url, "https://example.com/broken.xml");
        assert!(matches!(
            resolution.failures[0].error,
            SitemapError::MalformedXml(_)
        ));
        assert_eq!(resolution.failures[1].url, "https://example.com/down.xml");
        assert!(matches!(
            resolution.failures[1].error,
            SitemapError::Fetch(FetchError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_relative_child_locations_are_joined() {
        let fetcher = StaticFetcher::new()
            .with(SEED, &sitemap_index(&["/nested/posts.xml"]))
            .with("https://example.com/nested/posts.xml", &urlset(&[]));

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(
            resolution.sitemaps,
            vec![SEED, "https://example.com/nested/posts.xml"]
        );
    }

    #[tokio::test]
    async fn test_relative_locations_follow_redirects() {
        let fetcher = StaticFetcher::new()
            .with_redirect(SEED, "https://example.com/new/index.xml")
            .with("https://example.com/new/index.xml", &sitemap_index(&["child.xml"]))
            .with("https://example.com/new/child.xml", &urlset(&[]));

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(
            resolution.sitemaps,
            vec![SEED, "https://example.com/new/child.xml"]
        );
        assert!(resolution.failures.is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_is_a_harmless_leaf() {
        let fetcher = StaticFetcher::new().with(
            SEED,
            r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></sitemapindex>"#,
        );

        let resolution = resolve(&fetcher, SEED, &config()).await;

        assert_eq!(resolution.sitemaps, vec![SEED]);
        assert!(resolution.failures.is_empty());
    }
}
