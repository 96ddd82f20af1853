use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use super::ledger::{LedgerStorage, ResponseLedger};
use super::mastery;
use super::selector::{self, SelectionRule};
use super::types::{Difficulty, MasterySnapshot, Question, ResponseRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("no question is currently presented")]
    NoCurrentQuestion,
    #[error("question {0} has already been answered")]
    AlreadyAnswered(String),
    #[error("choice {choice_id} does not belong to question {question_id}")]
    UnknownChoice {
        question_id: String,
        choice_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub answered_count: usize,
    pub strongest_topic: Option<String>,
    pub toughest_difficulty: Option<Difficulty>,
}

/// Per-learner quiz state: the question on screen, the asked-set and the last answer.
#[derive(Debug, Clone, Default)]
pub struct AssessmentSession {
    current_question_id: Option<String>,
    asked: HashSet<String>,
    last_response: Option<ResponseRecord>,
    selected_choice_id: Option<String>,
}

impl AssessmentSession {
    pub fn start<R: Rng + ?Sized>(bank: &[Question], rng: &mut R) -> Self {
        Self {
            current_question_id: selector::initial_question(bank, rng).map(|q| q.id.clone()),
            ..Self::default()
        }
    }

    pub fn current<'a>(&self, bank: &'a [Question]) -> Option<&'a Question> {
        let id = self.current_question_id.as_deref()?;
        bank.iter().find(|question| question.id == id)
    }

    pub fn asked(&self) -> &HashSet<String> {
        &self.asked
    }

    pub fn last_response(&self) -> Option<&ResponseRecord> {
        self.last_response.as_ref()
    }

    pub fn selected_choice_id(&self) -> Option<&str> {
        self.selected_choice_id.as_deref()
    }

    pub fn has_answered(&self) -> bool {
        self.selected_choice_id.is_some()
    }

    /// Records the answer to the current question and marks it as asked.
    pub fn answer<S: LedgerStorage>(
        &mut self,
        bank: &[Question],
        ledger: &mut ResponseLedger<S>,
        choice_id: &str,
    ) -> Result<ResponseRecord, AssessmentError> {
        let question = self
            .current(bank)
            .ok_or(AssessmentError::NoCurrentQuestion)?;
        if self.has_answered() {
            return Err(AssessmentError::AlreadyAnswered(question.id.clone()));
        }
        if !question.has_choice(choice_id) {
            return Err(AssessmentError::UnknownChoice {
                question_id: question.id.clone(),
                choice_id: choice_id.to_string(),
            });
        }

        let record = ledger.record(question, choice_id);
        self.asked.insert(question.id.clone());
        self.last_response = Some(record.clone());
        self.selected_choice_id = Some(choice_id.to_string());
        Ok(record)
    }

    /// Moves to the next question chosen by the adaptive selector.
    pub fn advance<'a>(&mut self, bank: &'a [Question]) -> Option<(&'a Question, SelectionRule)> {
        let current = self.current(bank);
        let selection =
            selector::select_with_rule(bank, current, self.last_response.as_ref(), &self.asked)?;

        self.current_question_id = Some(selection.question.id.clone());
        self.selected_choice_id = None;
        Some((selection.question, selection.rule))
    }

    /// Forgets which questions were asked; the presented question stays.
    pub fn reset(&mut self) {
        self.asked.clear();
        self.last_response = None;
        self.selected_choice_id = None;
    }

    pub fn progress(&self, snapshot: &MasterySnapshot) -> ProgressOverview {
        ProgressOverview {
            answered_count: self.asked.len(),
            strongest_topic: mastery::strongest_topic(snapshot).map(str::to_string),
            toughest_difficulty: mastery::toughest_difficulty(snapshot),
        }
    }
}
