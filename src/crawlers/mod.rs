pub mod crawler;
pub mod extractor;
pub mod pipeline;
pub mod resolver;
pub mod throttle;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use crawler::{FetchedDocument, Fetcher};
pub use throttle::HostThrottle;
pub use web::HttpFetcher;
