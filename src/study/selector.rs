//! Adaptive question selection over `easy < medium < hard`.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::types::{Difficulty, Question, ResponseRecord};

/// Which candidate rule produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionRule {
    KeepCurrent,
    TopicContinuity,
    TargetDifficulty,
    AnyUnasked,
    Exhausted,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub question: &'a Question,
    pub rule: SelectionRule,
}

pub fn next_difficulty(current: Difficulty, correct: bool) -> Difficulty {
    if correct {
        current.harder()
    } else {
        current.easier()
    }
}

pub fn target_difficulty(previous: Option<&ResponseRecord>) -> Difficulty {
    match previous {
        Some(record) => next_difficulty(record.difficulty, record.correct),
        None => Difficulty::Medium,
    }
}

fn find_question<'a>(
    bank: &'a [Question],
    difficulty: Difficulty,
    asked: &HashSet<String>,
    topic: Option<&str>,
) -> Option<&'a Question> {
    bank.iter().find(|question| {
        question.difficulty == difficulty
            && !asked.contains(&question.id)
            && topic.map_or(true, |topic| question.topic == topic)
    })
}

/// Picks the next question. `asked` holds every question id already shown;
/// callers update it after each answer. Returns `None` only for an empty bank.
pub fn select_with_rule<'a>(
    bank: &'a [Question],
    current: Option<&'a Question>,
    previous: Option<&ResponseRecord>,
    asked: &HashSet<String>,
) -> Option<Selection<'a>> {
    if previous.is_none() {
        if let Some(question) = current.filter(|question| !asked.contains(&question.id)) {
            return Some(Selection {
                question,
                rule: SelectionRule::KeepCurrent,
            });
        }
    }

    let target = target_difficulty(previous);

    if let Some(record) = previous {
        if let Some(question) = find_question(bank, target, asked, Some(&record.topic)) {
            return Some(Selection {
                question,
                rule: SelectionRule::TopicContinuity,
            });
        }
    }

    if let Some(question) = find_question(bank, target, asked, None) {
        return Some(Selection {
            question,
            rule: SelectionRule::TargetDifficulty,
        });
    }

    if let Some(question) = bank.iter().find(|question| !asked.contains(&question.id)) {
        return Some(Selection {
            question,
            rule: SelectionRule::AnyUnasked,
        });
    }

    // Every question has been shown; repeats are accepted from here on.
    bank.first().map(|question| Selection {
        question,
        rule: SelectionRule::Exhausted,
    })
}

pub fn select_next_question<'a>(
    bank: &'a [Question],
    current: Option<&'a Question>,
    previous: Option<&ResponseRecord>,
    asked: &HashSet<String>,
) -> Option<&'a Question> {
    select_with_rule(bank, current, previous, asked).map(|selection| selection.question)
}

/// Opening question: a random `medium` one, or the first question if none exist.
pub fn initial_question<'a, R: Rng + ?Sized>(bank: &'a [Question], rng: &mut R) -> Option<&'a Question> {
    let medium: Vec<&Question> = bank
        .iter()
        .filter(|question| question.difficulty == Difficulty::Medium)
        .collect();
    medium.choose(rng).copied().or_else(|| bank.first())
}
