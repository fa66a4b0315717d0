use crate::error::ExtractError;
use std::path::PathBuf;
use url::Url;

/// Parse and check a seed URL (absolute, http or https)
pub fn parse_seed(seed: &str) -> Result<Url, ExtractError> {
    let invalid = |reason: String| ExtractError::InvalidSeed {
        url: seed.to_string(),
        reason,
    };

    let url = Url::parse(seed.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme `{other}`"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// Key used to group requests by host, including a non-default port
pub fn host_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Resolve a `<loc>` against the sitemap that listed it.
///
/// Absolute locations are returned unchanged; relative ones are joined
/// onto `base`.
pub fn resolve_loc(base: &str, loc: &str) -> String {
    match Url::parse(loc) {
        Ok(_) => loc.to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base)
            .and_then(|base| base.join(loc))
            .map(|joined| joined.to_string())
            .unwrap_or_else(|_| loc.to_string()),
        Err(_) => loc.to_string(),
    }
}

/// Convert a string to a sanitized filename
pub fn sanitize_filename(url: &str) -> String {
    // Remove protocol and replace invalid filename characters
    let name = url.replace("http://", "").replace("https://", "");
    let name = name.replace(['/', ':', '?', '&', '=', '#', '%'], "_");

    // Limit filename length
    name.chars().take(100).collect()
}

/// Default output file for a seed, e.g. `example.com_sitemap.xml.csv`
pub fn default_output_path(seed: &str, extension: &str) -> PathBuf {
    let stem = sanitize_filename(seed.trim_end_matches('/'));
    PathBuf::from(format!("{stem}.{extension}"))
}
