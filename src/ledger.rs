//! Score ledger
//!
//! The ledger is the append-only history of every graded submission. Each
//! submission becomes a new record, even for a player who already has one;
//! callers wanting "latest score per player" can reduce the list themselves.

use serde::{Deserialize, Serialize};

use crate::{
    constants,
    storage::{Error, KeyValueStore},
};

/// One graded submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Name the submission was made under
    #[serde(rename = "username", alias = "player")]
    pub player: String,
    /// Number of correctly answered questions
    pub score: usize,
}

impl ScoreRecord {
    /// Creates a new record
    pub fn new(player: impl Into<String>, score: usize) -> Self {
        Self {
            player: player.into(),
            score,
        }
    }
}

/// Append-only list of score records kept under a single storage key
#[derive(Debug, Clone)]
pub struct Ledger<S> {
    store: S,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Wraps a key-value store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a record to the ledger
    ///
    /// The stored list is re-read immediately before writing, so records
    /// appended through another handle on the same store are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be accessed, or if the stored list
    /// is corrupt. A corrupt list is left untouched rather than overwritten.
    pub fn record(&self, entry: ScoreRecord) -> Result<(), Error> {
        let mut records = self.all()?;
        records.push(entry);
        self.store
            .set(constants::ledger::KEY, &serde_json::to_string(&records)?)
    }

    /// Returns every record in insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or holds a corrupt list.
    pub fn all(&self) -> Result<Vec<ScoreRecord>, Error> {
        let Some(raw) = self.store.get(constants::ledger::KEY)? else {
            return Ok(Vec::new());
        };
        let records: Option<Vec<ScoreRecord>> = serde_json::from_str(&raw)?;

        Ok(records.unwrap_or_default())
    }

    /// Erases all records
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), Error> {
        self.store.remove(constants::ledger::KEY)
    }
}
