//! Position lifecycle and the per-cycle analysis loop.
//!
//! [`PositionEngine`] owns the single open position and applies the
//! transition rules; [`CycleRunner`] is the entry point surrounding
//! components drive once per timeframe tick.

mod cycle;
mod lifecycle;
mod stats;

pub use cycle::{Anomaly, CycleReport, CycleRunner};
pub use lifecycle::{EngineSettings, EngineState, PositionEngine, Transition};
pub use stats::TradeStats;
