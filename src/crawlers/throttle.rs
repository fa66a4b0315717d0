use crate::crawlers::crawler::{FetchedDocument, Fetcher};
use crate::error::FetchError;
use crate::utils::host_key;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};

/// Bounds the number of in-flight requests per host for any fetcher.
pub struct HostThrottle<F> {
    inner: F,
    per_host: usize,
    semaphores: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl<F: Fetcher> HostThrottle<F> {
    /// Wrap `inner`, allowing at most `per_host` concurrent requests to one host.
    /// A limit of zero is treated as one.
    pub fn new(inner: F, per_host: usize) -> Self {
        Self {
            inner,
            per_host: per_host.max(1),
            semaphores: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_host(&self) -> usize {
        self.per_host
    }

    async fn semaphore_for(&self, host: String) -> Arc<Semaphore> {
        let mut semaphores = self.semaphores.lock().await;
        Arc::clone(
            semaphores
                .entry(host)
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_host))),
        )
    }
}

#[async_trait]
impl<F: Fetcher> Fetcher for HostThrottle<F> {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let host = host_key(url);
        let semaphore = self.semaphore_for(host.clone()).await;
        let _permit = semaphore
            .acquire_owned()
            .await
            .map_err(|e| FetchError::transport(url, e))?;
        ::log::trace!("Acquired host permit for {} ({})", host, url);

        self.inner.fetch(url).await
    }
}
