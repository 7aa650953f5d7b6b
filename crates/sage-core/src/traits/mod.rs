//! Traits for the system's external collaborators.

mod market_data;
mod oracle;
mod sentiment;
mod store;

pub use market_data::{validate_ordering, FetchedBars, MarketDataSource};
pub use oracle::{RecommendationOracle, RecommendationRequest};
pub use sentiment::{SentimentFeed, SentimentSample};
pub use store::PositionStore;
