//! Data-fetching collaborators.
//!
//! Bar sources (exchange REST, CSV replay), the in-memory bar cache, the
//! Fear & Greed sentiment client, and the retry-with-backoff helper they
//! share. The core never retries; these collaborators hand it either a
//! completed result or a final error.

mod cache;
mod csv_source;
mod fear_greed;
mod rest_source;
mod retry;

pub use cache::BarCache;
pub use csv_source::CsvSource;
pub use fear_greed::FearGreedClient;
pub use rest_source::BinanceSource;
pub use retry::with_retry;
