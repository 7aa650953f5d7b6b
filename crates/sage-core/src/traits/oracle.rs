//! Reasoning oracle trait definitions.

use crate::error::OracleError;
use crate::types::{Bar, Position, Signal, Snapshot, TradeRecord};
use async_trait::async_trait;

/// Everything the reasoning step sees for one cycle.
#[derive(Debug, Clone)]
pub struct RecommendationRequest<'a> {
    pub snapshot: &'a Snapshot,
    /// Most recent closed bars, oldest first
    pub recent_bars: &'a [Bar],
    pub position: Option<&'a Position>,
    /// Recent closed trades, newest first
    pub recent_trades: &'a [TradeRecord],
}

/// Trait for the externally hosted reasoning step.
///
/// The oracle is an opaque collaborator: the core hands it a snapshot and
/// receives either a structured signal or a failure. Streaming, retries
/// and prompt mechanics are implementation details behind this trait; the
/// call must complete within a bounded timeout.
#[async_trait]
pub trait RecommendationOracle: Send + Sync {
    /// Produce a recommendation for the given market state.
    async fn recommend(&self, request: &RecommendationRequest<'_>)
        -> Result<Signal, OracleError>;

    /// Get the oracle name.
    fn name(&self) -> &str;
}
