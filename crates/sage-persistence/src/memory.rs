//! In-memory position store for tests and dry runs.

use std::sync::Mutex;

use sage_core::error::PersistenceError;
use sage_core::traits::PositionStore;
use sage_core::types::{Position, TradeRecord};

#[derive(Default)]
pub struct MemoryStore {
    position: Mutex<Option<Position>>,
    history: Mutex<Vec<TradeRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionStore for MemoryStore {
    fn load(&self) -> Result<Option<Position>, PersistenceError> {
        Ok(self.position.lock().expect("store mutex poisoned").clone())
    }

    fn save(&self, position: Option<&Position>) -> Result<(), PersistenceError> {
        *self.position.lock().expect("store mutex poisoned") = position.cloned();
        Ok(())
    }

    fn append(&self, record: &TradeRecord) -> Result<(), PersistenceError> {
        self.history
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(())
    }

    fn history(&self) -> Result<Vec<TradeRecord>, PersistenceError> {
        Ok(self.history.lock().expect("store mutex poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sage_core::types::{Confidence, Direction, ExitReason};

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let position = Position {
            direction: Direction::Short,
            entry_price: dec!(100),
            size: dec!(0.1),
            stop_loss: dec!(102),
            take_profit: dec!(96),
            opened_at: Utc::now(),
            confidence: Confidence::Low,
        };
        store.save(Some(&position)).unwrap();
        assert_eq!(store.load().unwrap(), Some(position.clone()));

        let record = position.into_record(dec!(96), Utc::now(), ExitReason::TakeProfit);
        store.append(&record).unwrap();
        store.save(None).unwrap();

        assert!(store.load().unwrap().is_none());
        assert_eq!(store.history().unwrap(), vec![record]);
    }
}
