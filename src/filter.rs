use crate::config::ExtractorConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for filtering extracted page URLs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFilterConfig {
    /// Host pages must be on (if None, all hosts are allowed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_domain: Option<String>,

    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl PageFilterConfig {
    /// Build the filter settings of a run, scoping to the seed host if requested
    pub fn from_extractor(config: &ExtractorConfig, seed: &Url) -> Self {
        Self {
            required_domain: if config.same_domain_only {
                seed.host_str().map(|host| host.to_string())
            } else {
                None
            },
            include_patterns: config.include_patterns.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        }
    }
}

/// Page URL filter that uses regex patterns and a host restriction
#[derive(Debug)]
pub struct PageFilter {
    config: PageFilterConfig,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl PageFilter {
    /// Compile the patterns of `config`, failing on the first invalid one
    pub fn new(config: PageFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = compile(&config.include_patterns)?;
        let exclude_regexes = compile(&config.exclude_patterns)?;

        Ok(Self {
            config,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Whether the filter can reject anything at all
    pub fn is_pass_through(&self) -> bool {
        self.config.required_domain.is_none()
            && self.include_regexes.is_empty()
            && self.exclude_regexes.is_empty()
    }

    /// Whether a page URL passes the host scope and the patterns.
    ///
    /// Exclusions win over inclusions; with no include patterns every
    /// in-scope URL that is not excluded is kept.
    pub fn should_keep(&self, page_url: &str) -> bool {
        self.is_in_domain_scope(page_url)
            && !self.exclude_regexes.iter().any(|re| re.is_match(page_url))
            && (self.include_regexes.is_empty()
                || self.include_regexes.iter().any(|re| re.is_match(page_url)))
    }

    /// Check if a page URL is on the required host
    fn is_in_domain_scope(&self, page_url: &str) -> bool {
        let Some(required_domain) = &self.config.required_domain else {
            return true;
        };

        match Url::parse(page_url) {
            Ok(url) => url
                .host_str()
                .is_some_and(|host| host.eq_ignore_ascii_case(required_domain)),
            Err(_) => false,
        }
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|pattern| Regex::new(pattern)).collect()
}
