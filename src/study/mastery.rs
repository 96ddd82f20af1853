use std::hash::Hash;

use indexmap::IndexMap;

use super::types::{Difficulty, MasterySnapshot, PerformanceSummary, ResponseRecord};

/// Groups records by `key_of` and computes `{correct, total, accuracy}` per group.
/// Groups come out in the order their key first appears in `records`.
pub fn summarize<'a, K, I, F>(records: I, key_of: F) -> IndexMap<K, PerformanceSummary>
where
    I: IntoIterator<Item = &'a ResponseRecord>,
    K: Eq + Hash,
    F: Fn(&ResponseRecord) -> K,
{
    let mut counts: IndexMap<K, (u32, u32)> = IndexMap::new();
    for record in records {
        let entry = counts.entry(key_of(record)).or_insert((0, 0));
        entry.1 += 1;
        if record.correct {
            entry.0 += 1;
        }
    }

    counts
        .into_iter()
        .map(|(key, (correct, total))| (key, PerformanceSummary::new(correct, total)))
        .collect()
}

pub fn by_topic(records: &[ResponseRecord]) -> IndexMap<String, PerformanceSummary> {
    summarize(records, |record| record.topic.clone())
}

pub fn by_difficulty(records: &[ResponseRecord]) -> IndexMap<Difficulty, PerformanceSummary> {
    summarize(records, |record| record.difficulty)
}

pub fn by_learning_objective(records: &[ResponseRecord]) -> IndexMap<String, PerformanceSummary> {
    summarize(records, |record| record.learning_objective_id.clone())
}

pub fn snapshot(records: &[ResponseRecord]) -> MasterySnapshot {
    MasterySnapshot {
        by_topic: by_topic(records),
        by_difficulty: by_difficulty(records),
        by_learning_objective: by_learning_objective(records),
    }
}

/// Topic with the highest accuracy. On ties the topic answered first wins.
pub fn strongest_topic(snapshot: &MasterySnapshot) -> Option<&str> {
    let mut best: Option<(&String, &PerformanceSummary)> = None;
    for entry in &snapshot.by_topic {
        match best {
            Some((_, summary)) if entry.1.accuracy <= summary.accuracy => {}
            _ => best = Some(entry),
        }
    }
    best.map(|(topic, _)| topic.as_str())
}

/// Difficulty with the lowest accuracy. On ties the level answered first wins.
pub fn toughest_difficulty(snapshot: &MasterySnapshot) -> Option<Difficulty> {
    let mut worst: Option<(&Difficulty, &PerformanceSummary)> = None;
    for entry in &snapshot.by_difficulty {
        match worst {
            Some((_, summary)) if entry.1.accuracy >= summary.accuracy => {}
            _ => worst = Some(entry),
        }
    }
    worst.map(|(difficulty, _)| *difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(topic: &str, difficulty: Difficulty, objective: &str, correct: bool) -> ResponseRecord {
        ResponseRecord {
            question_id: format!("q-{topic}"),
            topic: topic.to_string(),
            difficulty,
            learning_objective_id: objective.to_string(),
            correct,
            selected_choice_id: "a".to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn summarize_by_topic_counts_groups() {
        let records = vec![
            record("A", Difficulty::Easy, "lo1", true),
            record("A", Difficulty::Medium, "lo1", true),
            record("B", Difficulty::Hard, "lo2", false),
        ];

        let topics = by_topic(&records);
        assert_eq!(topics["A"], PerformanceSummary::new(2, 2));
        assert_eq!(topics["A"].accuracy, 1.0);
        assert_eq!(topics["B"].correct, 0);
        assert_eq!(topics["B"].total, 1);
        assert_eq!(topics["B"].accuracy, 0.0);
    }

    #[test]
    fn summarize_empty_ledger_is_empty() {
        let records: Vec<ResponseRecord> = Vec::new();
        assert!(summarize(&records, |r| r.topic.clone()).is_empty());
        assert_eq!(snapshot(&records), MasterySnapshot::default());
    }

    #[test]
    fn snapshot_covers_all_three_groupings() {
        let records = vec![
            record("A", Difficulty::Easy, "lo1", true),
            record("B", Difficulty::Easy, "lo2", false),
        ];
        let snap = snapshot(&records);
        assert_eq!(snap.by_topic.len(), 2);
        assert_eq!(snap.by_difficulty[&Difficulty::Easy], PerformanceSummary::new(1, 2));
        assert_eq!(snap.by_learning_objective["lo2"].accuracy, 0.0);
    }

    #[test]
    fn strongest_and_toughest_pick_extremes() {
        let records = vec![
            record("A", Difficulty::Easy, "lo1", true),
            record("B", Difficulty::Medium, "lo2", false),
            record("B", Difficulty::Hard, "lo2", true),
        ];
        let snap = snapshot(&records);
        assert_eq!(strongest_topic(&snap), Some("A"));
        assert_eq!(toughest_difficulty(&snap), Some(Difficulty::Medium));
    }

    #[test]
    fn rankings_are_none_without_data() {
        let snap = MasterySnapshot::default();
        assert_eq!(strongest_topic(&snap), None);
        assert_eq!(toughest_difficulty(&snap), None);
    }

    #[test]
    fn ties_resolve_to_first_answered() {
        let records = vec![
            record("Quantitative Methods", Difficulty::Medium, "lo", true),
            record("Ethics", Difficulty::Medium, "lo", true),
            record("Economics", Difficulty::Hard, "lo", false),
            record("Economics", Difficulty::Easy, "lo", false),
        ];
        let snap = snapshot(&records);
        assert_eq!(strongest_topic(&snap), Some("Quantitative Methods"));
        assert_eq!(toughest_difficulty(&snap), Some(Difficulty::Hard));
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let records = vec![
            record("B", Difficulty::Hard, "lo2", true),
            record("A", Difficulty::Easy, "lo1", false),
            record("B", Difficulty::Easy, "lo2", true),
        ];
        let topics: Vec<String> = by_topic(&records).into_keys().collect();
        assert_eq!(topics, ["B", "A"]);
        let levels: Vec<Difficulty> = by_difficulty(&records).keys().copied().collect();
        assert_eq!(levels, [Difficulty::Hard, Difficulty::Easy]);
    }
}
