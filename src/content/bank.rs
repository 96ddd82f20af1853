use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ContentError;
use crate::study::types::{Difficulty, LearningObjective, Question};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankMeta {
    pub topics: Vec<String>,
    pub difficulties: Vec<Difficulty>,
    pub learning_objectives: Vec<LearningObjective>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub metadata: QuestionBankMeta,
    pub questions: Vec<Question>,
}

impl QuestionBank {
    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let bank: QuestionBank = serde_json::from_str(raw)?;
        bank.validate()?;
        Ok(bank)
    }

    fn validate(&self) -> Result<(), ContentError> {
        let mut ids = HashSet::new();
        for question in &self.questions {
            if !ids.insert(question.id.as_str()) {
                return Err(ContentError::DuplicateQuestion(question.id.clone()));
            }
            if !question.has_choice(&question.answer_id) {
                return Err(ContentError::UnknownAnswer {
                    question_id: question.id.clone(),
                    answer_id: question.answer_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "metadata": {"topics": ["Ethics"], "difficulties": ["easy"], "learningObjectives": []},
        "questions": [{
            "id": "q1", "prompt": "p", "answerId": "a", "topic": "Ethics", "difficulty": "easy",
            "choices": [{"id": "a", "label": "A"}],
            "learningObjective": {"id": "lo", "description": "d"}
        }]
    }"#;

    #[test]
    fn parses_question_without_rationale() {
        let bank = QuestionBank::from_json(VALID).unwrap();
        let question = bank.get("q1").unwrap();
        assert!(question.rationale.is_none());
        assert!(bank.get("missing").is_none());
    }

    #[test]
    fn rejects_answer_outside_choices() {
        let raw = VALID.replace(r#""answerId": "a""#, r#""answerId": "z""#);
        let err = QuestionBank::from_json(&raw).unwrap_err();
        assert!(matches!(err, ContentError::UnknownAnswer { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = QuestionBank::from_json("{").unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }
}
