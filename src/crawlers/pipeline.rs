//! Runs resolution and extraction in sequence and assembles the report.

use crate::config::ExtractorConfig;
use crate::crawlers::crawler::Fetcher;
use crate::crawlers::{extractor, resolver};
use crate::error::{ExtractError, FetchError, SitemapError};
use crate::filter::{PageFilter, PageFilterConfig};
use crate::results::{ExtractionReport, ExtractionStats, PageRecord, SitemapFailure};
use crate::utils::parse_seed;
use std::collections::HashSet;

/// Discover every page listed under the seed sitemap.
///
/// Per-sitemap failures end up in the report. Only an invalid
/// configuration, an invalid seed or an unreachable seed is an error.
pub async fn run<F: Fetcher + ?Sized>(
    fetcher: &F,
    config: &ExtractorConfig,
) -> Result<ExtractionReport, ExtractError> {
    config.validate()?;
    let seed_url = parse_seed(&config.start_url)?;
    let seed = config.start_url.trim();
    let filter = PageFilter::new(PageFilterConfig::from_extractor(config, &seed_url))?;
    if !filter.is_pass_through() {
        ::log::debug!("Page filter active: {:?}", filter);
    }

    ::log::info!("Resolving sitemaps from {}", seed);
    let resolution = resolver::resolve(fetcher, seed, config).await;
    if let Some(error) = seed_transport_failure(&resolution.failures, seed) {
        return Err(ExtractError::UnreachableSeed(error.clone()));
    }
    ::log::info!(
        "{} sitemaps queued ({} repeated locations skipped)",
        resolution.sitemaps.len(),
        resolution.revisits_skipped
    );

    ::log::info!("Extracting page URLs from {} sitemaps", resolution.sitemaps.len());
    let extraction = extractor::extract_all(fetcher, &resolution.sitemaps, config).await;
    ::log::info!(
        "{} page URLs extracted from sitemap contents",
        extraction.pages.len()
    );

    let mut stats = ExtractionStats {
        sitemaps_queued: resolution.sitemaps.len(),
        revisits_skipped: resolution.revisits_skipped,
        contents_fetched: extraction.contents_fetched,
        urls_extracted: extraction.pages.len(),
        ..ExtractionStats::default()
    };

    let mut seen = HashSet::new();
    let mut pages = Vec::with_capacity(extraction.pages.len());
    for page_url in extraction.pages {
        if config.dedupe_pages && !seen.insert(page_url.clone()) {
            ::log::trace!("Dropping repeated page {}", page_url);
            stats.duplicate_pages += 1;
            continue;
        }
        if !filter.should_keep(&page_url) {
            ::log::trace!("Page filter rejected {}", page_url);
            stats.filtered_pages += 1;
            continue;
        }
        pages.push(PageRecord::new(page_url, config.custom_label.clone()));
    }
    stats.pages_written = pages.len();

    let mut failures = resolution.failures;
    failures.extend(extraction.failures);
    stats.failed_sitemaps = failures
        .iter()
        .map(|failure| failure.url.as_str())
        .collect::<HashSet<_>>()
        .len();

    if stats.failed_sitemaps > 0 {
        ::log::warn!(
            "{} sitemaps could not be processed; their pages are missing from the output",
            stats.failed_sitemaps
        );
    }

    Ok(ExtractionReport {
        seed: seed.to_string(),
        sitemaps: resolution.sitemaps,
        pages,
        failures,
        stats,
    })
}

fn seed_transport_failure<'a>(failures: &'a [SitemapFailure], seed: &str) -> Option<&'a FetchError> {
    failures.iter().find_map(|failure| match &failure.error {
        SitemapError::Fetch(error @ FetchError::Transport { .. }) if failure.url == seed => {
            Some(error)
        }
        _ => None,
    })
}
