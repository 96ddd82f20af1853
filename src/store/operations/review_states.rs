use crate::store::keys;
use crate::store::{Store, StoreError};
use crate::study::scheduler::{ReviewStates, ReviewStorage};

impl Store {
    pub fn get_review_states(&self, learner_id: &str) -> Result<Option<ReviewStates>, StoreError> {
        let key = keys::review_states_key(learner_id)?;
        match self.review_states.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn review_storage(&self, learner_id: &str) -> Result<SledReviewStorage, StoreError> {
        let key = keys::review_states_key(learner_id)?;
        Ok(SledReviewStorage {
            tree: self.review_states.clone(),
            key,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SledReviewStorage {
    tree: sled::Tree,
    key: String,
}

impl ReviewStorage for SledReviewStorage {
    fn load(&self) -> Option<ReviewStates> {
        let raw = match self.tree.get(self.key.as_bytes()) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(learner_id = %self.key, error = %e, "Failed to read review states");
                return None;
            }
        };
        match Store::deserialize::<ReviewStates>(&raw) {
            Ok(states) => Some(states),
            Err(e) => {
                tracing::warn!(learner_id = %self.key, error = %e, "Discarding unreadable review states");
                None
            }
        }
    }

    fn save(&mut self, states: &ReviewStates) {
        let result = Store::serialize(states)
            .and_then(|bytes| Ok(self.tree.insert(self.key.as_bytes(), bytes)?));
        if let Err(e) = result {
            tracing::warn!(learner_id = %self.key, error = %e, "Failed to persist review states");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::study::types::ReviewState;

    #[test]
    fn review_states_persist_per_learner() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let mut storage = store.review_storage("alice").unwrap();
        let mut states = ReviewStates::new();
        states.insert(
            "Economics:Define absolute advantage.".to_string(),
            ReviewState { due: 42, interval: 3 },
        );
        storage.save(&states);

        assert_eq!(store.get_review_states("alice").unwrap(), Some(states));
        assert!(store.review_storage("bob").unwrap().load().is_none());
    }

    #[test]
    fn unreadable_states_load_as_none() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.review_states.insert("alice", b"[]x".as_slice()).unwrap();
        assert!(store.review_storage("alice").unwrap().load().is_none());
    }
}
