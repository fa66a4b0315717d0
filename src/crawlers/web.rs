use crate::config::ExtractorConfig;
use crate::crawlers::crawler::{FetchedDocument, Fetcher};
use crate::error::{ExtractError, FetchError};
use async_trait::async_trait;
use reqwest::{Client, redirect};
use std::time::Duration;

/// HTTP fetcher backed by `reqwest`.
///
/// Follows redirects up to the configured limit and hands back every
/// response, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher from the transport settings of a configuration
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(ExtractError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let started = std::time::Instant::now();
        ::log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        if final_url != url {
            ::log::debug!("{} redirected to {}", url, final_url);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        ::log::trace!(
            "Fetched {} ({} bytes, HTTP {}) in {:.2} seconds",
            url,
            body.len(),
            status,
            started.elapsed().as_secs_f64()
        );

        Ok(FetchedDocument {
            url: url.to_string(),
            final_url,
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_returns_error_status_as_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(&ExtractorConfig::default()).unwrap();
        let url = format!("{}/sitemap.xml", mock_server.uri());
        let document = fetcher.fetch(&url).await.unwrap();

        assert_eq!(document.status, 404);
        assert!(!document.is_success());
        assert_eq!(document.body, b"<html>Not Found</html>");
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old.xml"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/new.xml", mock_server.uri())),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/new.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(&ExtractorConfig::default()).unwrap();
        let url = format!("{}/old.xml", mock_server.uri());
        let document = fetcher.fetch(&url).await.unwrap();

        assert_eq!(document.status, 200);
        assert_eq!(document.url, url);
        assert!(document.final_url.ends_with("/new.xml"));
        assert_eq!(document.body, b"<urlset/>");
    }

    /// A local address nothing listens on
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}/sitemap.xml")
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let url = closed_port_url();

        let fetcher = HttpFetcher::new(&ExtractorConfig::default()).unwrap();
        let result = fetcher.fetch(&url).await;

        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
