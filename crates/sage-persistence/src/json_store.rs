//! JSON-file position store.
//!
//! Two files under the data directory: `position.json` holds the open
//! position and is removed while flat; `trade_history.json` is an
//! append-only array of closed trades. Writes are whole-file rewrites;
//! the engine's in-memory state stays authoritative if one fails.

use std::fs;
use std::path::{Path, PathBuf};

use sage_core::error::PersistenceError;
use sage_core::traits::PositionStore;
use sage_core::types::{Position, TradeRecord};
use tracing::debug;

pub struct JsonStore {
    position_path: PathBuf,
    history_path: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|source| PersistenceError::Io {
            path: data_dir.display().to_string(),
            source,
        })?;

        Ok(Self {
            position_path: data_dir.join("position.json"),
            history_path: data_dir.join("trade_history.json"),
        })
    }

    fn read_history(&self) -> Result<Vec<TradeRecord>, PersistenceError> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.history_path).map_err(|source| {
            PersistenceError::Io {
                path: self.history_path.display().to_string(),
                source,
            }
        })?;
        serde_json::from_str(&text).map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    fn write_json<T: serde::Serialize>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        fs::write(path, text).map_err(|source| PersistenceError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl PositionStore for JsonStore {
    fn load(&self) -> Result<Option<Position>, PersistenceError> {
        if !self.position_path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.position_path).map_err(|source| {
            PersistenceError::Io {
                path: self.position_path.display().to_string(),
                source,
            }
        })?;
        let position =
            serde_json::from_str(&text).map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        Ok(Some(position))
    }

    fn save(&self, position: Option<&Position>) -> Result<(), PersistenceError> {
        match position {
            Some(position) => self.write_json(&self.position_path, position),
            None => {
                if self.position_path.exists() {
                    fs::remove_file(&self.position_path).map_err(|source| {
                        PersistenceError::Io {
                            path: self.position_path.display().to_string(),
                            source,
                        }
                    })?;
                }
                debug!("cleared persisted position");
                Ok(())
            }
        }
    }

    fn append(&self, record: &TradeRecord) -> Result<(), PersistenceError> {
        let mut history = self.read_history()?;
        history.push(record.clone());
        self.write_json(&self.history_path, &history)
    }

    fn history(&self) -> Result<Vec<TradeRecord>, PersistenceError> {
        self.read_history()
    }
}
