use crate::store::keys;
use crate::store::{Store, StoreError};
use crate::study::ledger::{LedgerState, LedgerStorage};

impl Store {
    pub fn get_ledger(&self, learner_id: &str) -> Result<Option<LedgerState>, StoreError> {
        let key = keys::responses_key(learner_id)?;
        match self.responses.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn count_ledgers(&self) -> usize {
        self.responses.len()
    }

    pub fn ledger_storage(&self, learner_id: &str) -> Result<SledLedgerStorage, StoreError> {
        let key = keys::responses_key(learner_id)?;
        Ok(SledLedgerStorage {
            tree: self.responses.clone(),
            key,
        })
    }
}

/// Ledger snapshots for one learner, stored whole under the learner's key.
#[derive(Debug, Clone)]
pub struct SledLedgerStorage {
    tree: sled::Tree,
    key: String,
}

impl LedgerStorage for SledLedgerStorage {
    fn load(&self) -> Option<LedgerState> {
        let raw = match self.tree.get(self.key.as_bytes()) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(learner_id = %self.key, error = %e, "Failed to read response ledger");
                return None;
            }
        };
        match Store::deserialize::<LedgerState>(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(learner_id = %self.key, error = %e, "Discarding unreadable response ledger");
                None
            }
        }
    }

    fn save(&mut self, state: &LedgerState) {
        let result = Store::serialize(state)
            .and_then(|bytes| Ok(self.tree.insert(self.key.as_bytes(), bytes)?));
        if let Err(e) = result {
            tracing::warn!(learner_id = %self.key, error = %e, "Failed to persist response ledger");
        }
    }
}
