use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// One level harder, saturating at `Hard`.
    pub fn harder(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One level easier, saturating at `Easy`.
    pub fn easier(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningObjective {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionChoice {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<QuestionChoice>,
    pub answer_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub learning_objective: LearningObjective,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Question {
    pub fn has_choice(&self, choice_id: &str) -> bool {
        self.choices.iter().any(|choice| choice.id == choice_id)
    }

    pub fn is_correct(&self, choice_id: &str) -> bool {
        self.answer_id == choice_id
    }
}

/// One answered question. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub question_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub learning_objective_id: String,
    pub correct: bool,
    pub selected_choice_id: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub correct: u32,
    pub total: u32,
    pub accuracy: f64,
}

impl PerformanceSummary {
    pub fn new(correct: u32, total: u32) -> Self {
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        Self {
            correct,
            total,
            accuracy,
        }
    }

    /// Accuracy rounded to a whole percentage.
    pub fn accuracy_percent(&self) -> i64 {
        (self.accuracy * 100.0).round() as i64
    }
}

/// Per-group performance. Each map lists its keys in the order they first
/// appear in the ledger.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterySnapshot {
    pub by_topic: IndexMap<String, PerformanceSummary>,
    pub by_difficulty: IndexMap<Difficulty, PerformanceSummary>,
    pub by_learning_objective: IndexMap<String, PerformanceSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Unix epoch milliseconds after which the card is eligible for review.
    pub due: i64,
    /// Interval in days that produced `due`.
    pub interval: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Again,
    Good,
    Easy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub prompt: String,
    pub answer: String,
    pub source: String,
}

/// A curriculum objective of a topic module, distinct from the
/// `LearningObjective` a question is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleObjective {
    pub id: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaSummary {
    pub name: String,
    pub expression: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamTip {
    pub focus: String,
    pub guidance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineEmphasis {
    Core,
    Exam,
    Application,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub label: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<TimelineEmphasis>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicModule {
    pub id: String,
    pub name: String,
    pub source_volume: String,
    #[serde(default)]
    pub learning_objectives: Vec<ModuleObjective>,
    #[serde(default)]
    pub formulas: Vec<FormulaSummary>,
    #[serde(default)]
    pub exam_tips: Vec<ExamTip>,
    pub flashcards: Vec<Flashcard>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}
