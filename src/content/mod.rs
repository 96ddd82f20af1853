//! Read-only study content embedded in the binary.

pub mod bank;
pub mod topics;

use thiserror::Error;

use crate::study::types::{Flashcard, TopicModule};

pub use bank::QuestionBank;

const QUESTION_BANK_JSON: &str = include_str!("../../content/question_bank.json");
const TOPICS_JSON: &str = include_str!("../../content/topics.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(String),
    #[error("question {question_id} answer {answer_id} is not one of its choices")]
    UnknownAnswer {
        question_id: String,
        answer_id: String,
    },
    #[error("duplicate flashcard prompt in topic {topic}: {prompt}")]
    DuplicateFlashcard { topic: String, prompt: String },
}

#[derive(Debug, Clone)]
pub struct Content {
    pub bank: QuestionBank,
    pub topics: Vec<TopicModule>,
}

impl Content {
    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_json(QUESTION_BANK_JSON, TOPICS_JSON)
    }

    pub fn from_json(bank_json: &str, topics_json: &str) -> Result<Self, ContentError> {
        let bank = QuestionBank::from_json(bank_json)?;
        let topics = topics::from_json(topics_json)?;
        tracing::info!(
            questions = bank.questions.len(),
            topics = topics.len(),
            flashcards = topics.iter().map(|t| t.flashcards.len()).sum::<usize>(),
            formulas = topics.iter().map(|t| t.formulas.len()).sum::<usize>(),
            "Study content loaded"
        );
        Ok(Self { bank, topics })
    }

    /// Every flashcard paired with its topic name, in content order.
    pub fn flashcards(&self) -> impl Iterator<Item = (&str, &Flashcard)> {
        self.topics.iter().flat_map(|topic| {
            topic
                .flashcards
                .iter()
                .map(move |card| (topic.name.as_str(), card))
        })
    }

    pub fn has_card_key(&self, key: &str) -> bool {
        self.flashcards()
            .any(|(topic, card)| crate::study::scheduler::card_key(topic, &card.prompt) == key)
    }
}
