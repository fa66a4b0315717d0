use clap::Parser;
use sitemap_extract::{ExtractError, ExtractionReport, Sitemaps, output, utils};
use std::error::Error;

mod args;
use args::{Args, convert_format};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("Extraction failed: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let sitemaps = build_sitemaps(&args)?;

    let seed = sitemaps.config().start_url.clone();
    if seed.is_empty() {
        return Err("no seed URL given on the command line or in the configuration".into());
    }

    let format = convert_format(args.format);
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| utils::default_output_path(&seed, format.extension()));

    ::log::info!("Starting extraction from {}", seed);
    let start_time = std::time::Instant::now();
    let report = sitemaps.run().await?;

    output::write_to_path(&output_path, &report.pages, format)?;

    print_summary(&report, start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Load the configuration file, then let command-line values override it
fn build_sitemaps(args: &Args) -> Result<Sitemaps, ExtractError> {
    let mut sitemaps = Sitemaps::new("");
    if let Some(path) = &args.config {
        sitemaps = sitemaps.with_config_file(path)?;
    }
    if let Some(url) = &args.url {
        sitemaps = sitemaps.with_start_url(url);
    }
    Ok(apply_flags(sitemaps, args))
}

fn apply_flags(mut sitemaps: Sitemaps, args: &Args) -> Sitemaps {
    if let Some(concurrency) = args.concurrency {
        sitemaps = sitemaps.with_max_concurrency(concurrency);
    }
    if let Some(per_host) = args.per_host {
        sitemaps = sitemaps.with_per_host_limit(per_host);
    }
    if let Some(timeout) = args.timeout {
        sitemaps = sitemaps.with_request_timeout(timeout);
    }
    if let Some(total_timeout) = args.total_timeout {
        sitemaps = sitemaps.with_total_timeout(total_timeout);
    }
    if let Some(label) = &args.label {
        sitemaps = sitemaps.with_custom_label(label.as_str());
    }
    if !args.include.is_empty() {
        sitemaps = sitemaps.with_include_patterns(args.include.clone());
    }
    if !args.exclude.is_empty() {
        sitemaps = sitemaps.with_exclude_patterns(args.exclude.clone());
    }
    if args.same_domain {
        sitemaps = sitemaps.same_domain_only(true);
    }
    if args.keep_duplicates {
        sitemaps = sitemaps.keep_duplicates(true);
    }
    if args.strict_status {
        sitemaps = sitemaps.fail_on_http_error(true);
    }
    sitemaps
}

// Summary goes to stderr so `--output -` stays clean
fn print_summary(report: &ExtractionReport, seconds: f64) {
    let stats = &report.stats;
    eprintln!(
        "{} sitemaps resolved, {} page URLs extracted, {} written in {:.2} seconds",
        stats.sitemaps_queued, stats.urls_extracted, stats.pages_written, seconds
    );
    if stats.duplicate_pages > 0 || stats.filtered_pages > 0 {
        eprintln!(
            "{} duplicates dropped, {} filtered out",
            stats.duplicate_pages, stats.filtered_pages
        );
    }
    for failure in &report.failures {
        eprintln!("  [{}] {}: {}", failure.error.kind(), failure.url, failure.error);
    }
}
