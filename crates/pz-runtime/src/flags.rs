use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use log::debug;
use pz_core::{Flag, FlagScope, LocalData, PuzzleError};

/// Key under which persistence backends file the global flag record.
pub const GLOBAL_FLAG_NAMESPACE: &str = "passcode-puzzles.global-flags";

pub type FlagRecord = BTreeMap<String, bool>;

/// Backing storage for global flags: one record read and written whole.
pub trait FlagPersistence: Send + Sync {
    fn load_record(&self) -> Result<FlagRecord, PuzzleError>;
    fn persist_record(&self, record: &FlagRecord) -> Result<(), PuzzleError>;
}

#[derive(Debug, Default)]
pub struct MemoryFlagPersistence {
    record: Mutex<FlagRecord>,
}

impl MemoryFlagPersistence {
    pub fn with_record(record: FlagRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    pub fn record(&self) -> FlagRecord {
        match self.record.lock() {
            Ok(record) => record.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FlagPersistence for MemoryFlagPersistence {
    fn load_record(&self) -> Result<FlagRecord, PuzzleError> {
        Ok(self.record())
    }

    fn persist_record(&self, record: &FlagRecord) -> Result<(), PuzzleError> {
        let mut guard = self.record.lock().map_err(|_| {
            PuzzleError::new("FLAGS_LOCK_POISONED", "Global flag record lock is poisoned.")
        })?;
        *guard = record.clone();
        Ok(())
    }
}

/// Reads and writes flags in either scope. Local flags live in the caller's
/// `LocalData`; the store only holds the handle to global persistence.
#[derive(Clone)]
pub struct FlagStore {
    persistence: Arc<dyn FlagPersistence>,
}

impl FlagStore {
    pub fn new(persistence: Arc<dyn FlagPersistence>) -> Self {
        Self { persistence }
    }

    pub fn get(&self, flag: &Flag, local: &LocalData) -> Result<Option<bool>, PuzzleError> {
        match flag.scope {
            FlagScope::Local => Ok(local.flag(&flag.key)),
            FlagScope::Global => Ok(self.persistence.load_record()?.get(&flag.key).copied()),
        }
    }

    /// Unset flags read as false.
    pub fn is_set(&self, flag: &Flag, local: &LocalData) -> Result<bool, PuzzleError> {
        Ok(self.get(flag, local)?.unwrap_or(false))
    }

    /// Returns the local data in effect after the write. Global writes merge
    /// the single key into the persisted record and hand `local` back as is.
    pub fn set(
        &self,
        flag: &Flag,
        value: bool,
        local: &LocalData,
    ) -> Result<LocalData, PuzzleError> {
        debug!("set {:?} flag \"{}\" = {}", flag.scope, flag.key, value);
        match flag.scope {
            FlagScope::Local => Ok(local.with_flag(&flag.key, value)),
            FlagScope::Global => {
                let mut record = self.persistence.load_record()?;
                record.insert(flag.key.clone(), value);
                self.persistence.persist_record(&record)?;
                Ok(local.clone())
            }
        }
    }
}
