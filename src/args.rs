use clap::{Parser, ValueEnum};
use sitemap_extract::OutputFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitemap-extract")]
#[command(about = "Extracts every page URL listed under a sitemap or sitemap index")]
#[command(version)]
pub struct Args {
    /// Seed sitemap or sitemap index URL
    pub url: Option<String>,

    /// JSON configuration file (command-line flags take precedence)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output file (`-` for stdout); defaults to a name derived from the seed URL
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,

    /// Number of concurrent fetches per stage
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Number of concurrent fetches to one host
    #[arg(long)]
    pub per_host: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Total timeout in seconds (maximum runtime)
    #[arg(long)]
    pub total_timeout: Option<u64>,

    /// Label written next to every page URL
    #[arg(short, long)]
    pub label: Option<String>,

    /// Only keep page URLs matching this regex (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Drop page URLs matching this regex (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Only keep pages on the seed's host
    #[arg(long)]
    pub same_domain: bool,

    /// Keep repeated page URLs
    #[arg(long)]
    pub keep_duplicates: bool,

    /// Treat non-2xx responses as failures without reading their bodies
    #[arg(long)]
    pub strict_status: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

/// Convert from CLI argument format to output format
pub fn convert_format(arg: FormatArg) -> OutputFormat {
    match arg {
        FormatArg::Csv => OutputFormat::Csv,
        FormatArg::Json => OutputFormat::Json,
    }
}
