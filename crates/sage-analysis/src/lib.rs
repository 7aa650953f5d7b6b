//! Multi-timeframe aggregation: windows over the base bar history, the
//! full indicator roster per window, and the consolidated snapshot.

mod aggregator;
mod sentiment;

pub use aggregator::{Aggregator, WindowSpec};
pub use sentiment::{merge_sentiment, sentiment_label};
