//! Cross-topic review: the global formula sheet and the mixed flashcard quiz.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::scheduler::card_key;
use super::types::{Flashcard, FormulaSummary, TopicModule};

/// Distractor answers drawn from other cards.
pub const MIXED_QUIZ_DISTRACTORS: usize = 3;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaEntry<'a> {
    pub topic: &'a str,
    #[serde(flatten)]
    pub formula: &'a FormulaSummary,
}

/// Every formula of every topic, in topic order.
pub fn formula_sheet(topics: &[TopicModule]) -> Vec<FormulaEntry<'_>> {
    topics
        .iter()
        .flat_map(|topic| {
            topic.formulas.iter().map(move |formula| FormulaEntry {
                topic: topic.name.as_str(),
                formula,
            })
        })
        .collect()
}

/// One flashcard posed as multiple choice. `answer` is kept server-side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedQuiz {
    pub key: String,
    pub topic: String,
    pub prompt: String,
    pub choices: Vec<String>,
    #[serde(skip)]
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedQuizResult {
    pub correct: bool,
    pub correct_answer: String,
    pub feedback: String,
}

/// Draws a random card and up to three other cards' answers as distractors,
/// then shuffles the choices. `None` when there are no flashcards.
pub fn mixed_quiz<R: Rng + ?Sized>(topics: &[TopicModule], rng: &mut R) -> Option<MixedQuiz> {
    let mut cards: Vec<(&str, &Flashcard)> = topics
        .iter()
        .flat_map(|topic| {
            topic
                .flashcards
                .iter()
                .map(move |card| (topic.name.as_str(), card))
        })
        .collect();
    cards.shuffle(rng);

    let (&(topic, card), rest) = cards.split_first()?;
    let mut choices: Vec<String> = std::iter::once(card.answer.clone())
        .chain(
            rest.iter()
                .take(MIXED_QUIZ_DISTRACTORS)
                .map(|(_, other)| other.answer.clone()),
        )
        .collect();
    choices.shuffle(rng);

    Some(MixedQuiz {
        key: card_key(topic, &card.prompt),
        topic: topic.to_string(),
        prompt: card.prompt.clone(),
        choices,
        answer: card.answer.clone(),
    })
}

/// Grades a mixed-quiz pick by answer text. `None` for an unknown card key.
pub fn check_mixed_answer(
    topics: &[TopicModule],
    key: &str,
    answer: &str,
) -> Option<MixedQuizResult> {
    let card = topics.iter().find_map(|topic| {
        topic
            .flashcards
            .iter()
            .find(|card| card_key(&topic.name, &card.prompt) == key)
    })?;

    let correct = card.answer == answer;
    let feedback = if correct {
        "Correct! Reinforce the rationale in your own words.".to_string()
    } else {
        format!("Not quite. Correct answer: {}", card.answer)
    };
    Some(MixedQuizResult {
        correct,
        correct_answer: card.answer.clone(),
        feedback,
    })
}
