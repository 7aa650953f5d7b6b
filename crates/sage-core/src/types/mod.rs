//! Core data types for the analysis system.

mod bar;
mod position;
mod signal;
mod snapshot;
mod timeframe;

pub use bar::{Bar, BarSeries};
pub use position::{Direction, ExitReason, Position, TradeRecord};
pub use signal::{Confidence, Signal, SignalAction};
pub use snapshot::{SentimentSnapshot, Snapshot, WindowMetrics, WindowSnapshot};
pub use timeframe::Timeframe;
