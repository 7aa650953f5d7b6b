//! Position persistence trait definitions.

use crate::error::PersistenceError;
use crate::types::{Position, TradeRecord};

/// Trait for position and trade-history persistence.
///
/// Called synchronously around lifecycle transitions. A failed write is
/// reported to the caller and retried on the next mutation; the in-memory
/// position remains authoritative for the process lifetime.
pub trait PositionStore: Send + Sync {
    /// Load the persisted open position, if any.
    fn load(&self) -> Result<Option<Position>, PersistenceError>;

    /// Persist the current open position; `None` clears it.
    fn save(&self, position: Option<&Position>) -> Result<(), PersistenceError>;

    /// Append a closed trade to the history.
    fn append(&self, record: &TradeRecord) -> Result<(), PersistenceError>;

    /// Load the full trade history, oldest first.
    fn history(&self) -> Result<Vec<TradeRecord>, PersistenceError>;
}
