//! Response ledger: ordered, append-only answer history for one learner.
//!
//! The ledger is the single source of truth for every mastery statistic.
//! Summaries are derived on demand and never persisted alongside it.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::{Question, ResponseRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub responses: Vec<ResponseRecord>,
}

/// Snapshot persistence for a ledger.
///
/// Implementations never fail towards the ledger: a broken read is reported
/// as `None` and a broken write is dropped, both after logging.
pub trait LedgerStorage: Send {
    fn load(&self) -> Option<LedgerState>;
    fn save(&mut self, state: &LedgerState);
}

#[derive(Debug, Default)]
pub struct MemoryLedgerStorage {
    state: Option<LedgerState>,
    saves: usize,
}

impl MemoryLedgerStorage {
    pub fn with_state(state: LedgerState) -> Self {
        Self {
            state: Some(state),
            saves: 0,
        }
    }

    pub fn saved(&self) -> Option<&LedgerState> {
        self.state.as_ref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl LedgerStorage for MemoryLedgerStorage {
    fn load(&self) -> Option<LedgerState> {
        self.state.clone()
    }

    fn save(&mut self, state: &LedgerState) {
        self.state = Some(state.clone());
        self.saves += 1;
    }
}

pub type Subscriber = Box<dyn Fn(&LedgerState) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct ResponseLedger<S: LedgerStorage> {
    state: LedgerState,
    storage: S,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S: LedgerStorage> ResponseLedger<S> {
    pub fn open(storage: S) -> Self {
        let state = storage.load().unwrap_or_default();
        Self {
            state,
            storage,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn records(&self) -> &[ResponseRecord] {
        &self.state.responses
    }

    pub fn len(&self) -> usize {
        self.state.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.responses.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn record(&mut self, question: &Question, selected_choice_id: &str) -> ResponseRecord {
        self.record_at(question, selected_choice_id, Utc::now().timestamp_millis())
    }

    pub fn record_at(
        &mut self,
        question: &Question,
        selected_choice_id: &str,
        timestamp_ms: i64,
    ) -> ResponseRecord {
        let record = ResponseRecord {
            question_id: question.id.clone(),
            topic: question.topic.clone(),
            difficulty: question.difficulty,
            learning_objective_id: question.learning_objective.id.clone(),
            correct: question.is_correct(selected_choice_id),
            selected_choice_id: selected_choice_id.to_string(),
            timestamp: timestamp_ms,
        };

        self.state.responses.push(record.clone());
        self.notify();
        record
    }

    /// Empties the ledger. Irreversible.
    pub fn reset(&mut self) {
        self.state.responses.clear();
        self.notify();
    }

    /// The `limit` most recent records, newest first. Records sharing a
    /// timestamp keep their insertion order.
    pub fn recent(&self, limit: usize) -> Vec<ResponseRecord> {
        let mut records = self.state.responses.clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit);
        records
    }

    fn notify(&mut self) {
        self.storage.save(&self.state);
        for (_, subscriber) in &self.subscribers {
            subscriber(&self.state);
        }
    }
}
