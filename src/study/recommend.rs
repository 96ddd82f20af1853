//! Practice recommendations and diagnostic signals derived from the ledger.

use std::collections::HashSet;

use indexmap::IndexMap;

use serde::Serialize;

use super::types::{Difficulty, LearningObjective, PerformanceSummary, Question, ResponseRecord};

const STRENGTH_HIGHLIGHTS: usize = 3;
const OBJECTIVE_SIGNALS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationSettings {
    /// Topics at or above this accuracy are not recommended.
    pub accuracy_threshold: f64,
    pub max_recommendations: usize,
    /// Minimum attempts before a topic can appear as a strength.
    pub strength_min_attempts: u32,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            accuracy_threshold: 0.8,
            max_recommendations: 5,
            strength_min_attempts: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation<'a> {
    pub question: &'a Question,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSignal {
    pub topic: String,
    pub performance: PerformanceSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultySignal {
    pub difficulty: Difficulty,
    pub performance: PerformanceSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveSignal {
    pub objective_id: String,
    pub description: String,
    pub performance: PerformanceSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport<'a> {
    pub recommendations: Vec<Recommendation<'a>>,
    pub strengths: Vec<TopicSignal>,
    pub areas_to_improve: Vec<DifficultySignal>,
    pub objective_signals: Vec<ObjectiveSignal>,
}

fn ascending_by_accuracy<K: Clone>(
    groups: &IndexMap<K, PerformanceSummary>,
) -> Vec<(K, PerformanceSummary)> {
    let mut entries: Vec<(K, PerformanceSummary)> = groups
        .iter()
        .map(|(key, summary)| (key.clone(), *summary))
        .collect();
    entries.sort_by(|a, b| a.1.accuracy.total_cmp(&b.1.accuracy));
    entries
}

/// Weakest topics first. Each weak topic contributes the first bank question that
/// is either unseen or was previously missed.
pub fn recommendation_queue<'a>(
    bank: &'a [Question],
    records: &[ResponseRecord],
    by_topic: &IndexMap<String, PerformanceSummary>,
    settings: &RecommendationSettings,
) -> Vec<Recommendation<'a>> {
    let seen: HashSet<&str> = records.iter().map(|r| r.question_id.as_str()).collect();
    let missed: HashSet<&str> = records
        .iter()
        .filter(|r| !r.correct)
        .map(|r| r.question_id.as_str())
        .collect();

    let mut recommendations = Vec::new();
    for (topic, performance) in ascending_by_accuracy(by_topic) {
        if performance.total == 0 || performance.accuracy >= settings.accuracy_threshold {
            continue;
        }

        let target = bank.iter().find(|question| {
            question.topic == topic
                && (!seen.contains(question.id.as_str()) || missed.contains(question.id.as_str()))
        });

        if let Some(question) = target {
            recommendations.push(Recommendation {
                question,
                reason: format!(
                    "Build proficiency in {topic} (current accuracy {}%).",
                    performance.accuracy_percent()
                ),
            });
        }
    }

    if recommendations.is_empty() {
        if let Some(question) = bank
            .iter()
            .find(|question| !seen.contains(question.id.as_str()))
        {
            recommendations.push(Recommendation {
                question,
                reason: "Introduce a new concept to expand your coverage.".to_string(),
            });
        }
    }

    recommendations.truncate(settings.max_recommendations);
    recommendations
}

pub fn strength_highlights(
    by_topic: &IndexMap<String, PerformanceSummary>,
    settings: &RecommendationSettings,
) -> Vec<TopicSignal> {
    let mut entries: Vec<TopicSignal> = by_topic
        .iter()
        .filter(|(_, performance)| performance.total >= settings.strength_min_attempts)
        .map(|(topic, performance)| TopicSignal {
            topic: topic.clone(),
            performance: *performance,
        })
        .collect();
    entries.sort_by(|a, b| b.performance.accuracy.total_cmp(&a.performance.accuracy));
    entries.truncate(STRENGTH_HIGHLIGHTS);
    entries
}

pub fn areas_to_improve(
    by_difficulty: &IndexMap<Difficulty, PerformanceSummary>,
) -> Vec<DifficultySignal> {
    ascending_by_accuracy(by_difficulty)
        .into_iter()
        .map(|(difficulty, performance)| DifficultySignal {
            difficulty,
            performance,
        })
        .collect()
}

pub fn objective_signals(
    by_objective: &IndexMap<String, PerformanceSummary>,
    objectives: &[LearningObjective],
) -> Vec<ObjectiveSignal> {
    ascending_by_accuracy(by_objective)
        .into_iter()
        .filter(|(_, performance)| performance.total > 0)
        .take(OBJECTIVE_SIGNALS)
        .map(|(objective_id, performance)| {
            let description = objectives
                .iter()
                .find(|objective| objective.id == objective_id)
                .map(|objective| objective.description.clone())
                .unwrap_or_else(|| objective_id.clone());
            ObjectiveSignal {
                objective_id,
                description,
                performance,
            }
        })
        .collect()
}
