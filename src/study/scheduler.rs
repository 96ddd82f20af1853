//! Flashcard review scheduling with a fixed linear interval policy:
//! `again` resets to one day, `good` adds two days, `easy` adds five.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

use super::types::{Flashcard, ReviewAction, ReviewState};

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;

/// Flat `"<topic>:<prompt>"` -> review state mapping.
pub type ReviewStates = HashMap<String, ReviewState>;

/// Identity of a card within the review state map. Assumes prompts are unique
/// within a topic; content loading rejects collisions.
pub fn card_key(topic: &str, prompt: &str) -> String {
    format!("{topic}:{prompt}")
}

pub fn default_review(now_ms: i64) -> ReviewState {
    ReviewState {
        due: now_ms,
        interval: DEFAULT_INTERVAL_DAYS,
    }
}

pub fn next_interval(previous_interval: u32, action: ReviewAction) -> u32 {
    match action {
        ReviewAction::Again => 1,
        ReviewAction::Good => previous_interval.saturating_add(2),
        ReviewAction::Easy => previous_interval.saturating_add(5),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry<'a> {
    pub key: String,
    pub topic: &'a str,
    pub card: &'a Flashcard,
    pub review: ReviewState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total: usize,
    pub due_now: usize,
    pub next_due: Option<i64>,
}

/// Every card with its review state (defaulted to due now), ascending by due.
/// Cards sharing a due time keep their input order.
pub fn queue<'a, I>(cards: I, states: &ReviewStates, now_ms: i64) -> Vec<QueueEntry<'a>>
where
    I: IntoIterator<Item = (&'a str, &'a Flashcard)>,
{
    let mut entries: Vec<QueueEntry<'a>> = cards
        .into_iter()
        .map(|(topic, card)| {
            let key = card_key(topic, &card.prompt);
            let review = states
                .get(&key)
                .copied()
                .unwrap_or_else(|| default_review(now_ms));
            QueueEntry {
                key,
                topic,
                card,
                review,
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.review.due);
    entries
}

/// First entry already due, otherwise the earliest-due entry overall.
pub fn select_next<'q, 'a>(queue: &'q [QueueEntry<'a>], now_ms: i64) -> Option<&'q QueueEntry<'a>> {
    queue
        .iter()
        .find(|entry| entry.review.due <= now_ms)
        .or_else(|| queue.iter().min_by_key(|entry| entry.review.due))
}

pub fn queue_stats(queue: &[QueueEntry<'_>], now_ms: i64) -> QueueStats {
    QueueStats {
        total: queue.len(),
        due_now: queue
            .iter()
            .filter(|entry| entry.review.due <= now_ms)
            .count(),
        next_due: select_next(queue, now_ms).map(|entry| entry.review.due),
    }
}

/// Review state persistence. Same failure contract as ledger storage.
pub trait ReviewStorage: Send {
    fn load(&self) -> Option<ReviewStates>;
    fn save(&mut self, states: &ReviewStates);
}

#[derive(Debug, Default)]
pub struct MemoryReviewStorage {
    states: Option<ReviewStates>,
}

impl MemoryReviewStorage {
    pub fn saved(&self) -> Option<&ReviewStates> {
        self.states.as_ref()
    }
}

impl ReviewStorage for MemoryReviewStorage {
    fn load(&self) -> Option<ReviewStates> {
        self.states.clone()
    }

    fn save(&mut self, states: &ReviewStates) {
        self.states = Some(states.clone());
    }
}

pub struct ReviewScheduler<S: ReviewStorage> {
    states: ReviewStates,
    storage: S,
}

impl<S: ReviewStorage> ReviewScheduler<S> {
    pub fn open(storage: S) -> Self {
        let states = storage.load().unwrap_or_default();
        Self { states, storage }
    }

    pub fn states(&self) -> &ReviewStates {
        &self.states
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn queue<'a, I>(&self, cards: I, now_ms: i64) -> Vec<QueueEntry<'a>>
    where
        I: IntoIterator<Item = (&'a str, &'a Flashcard)>,
    {
        queue(cards, &self.states, now_ms)
    }

    pub fn grade(&mut self, key: &str, action: ReviewAction) -> ReviewState {
        self.grade_at(key, action, Utc::now().timestamp_millis())
    }

    pub fn grade_at(&mut self, key: &str, action: ReviewAction, now_ms: i64) -> ReviewState {
        let previous = self
            .states
            .get(key)
            .map(|state| state.interval)
            .unwrap_or(DEFAULT_INTERVAL_DAYS);
        let interval = next_interval(previous, action);
        let state = ReviewState {
            due: now_ms.saturating_add(i64::from(interval) * MILLIS_PER_DAY),
            interval,
        };

        self.states.insert(key.to_string(), state);
        self.storage.save(&self.states);
        state
    }
}
