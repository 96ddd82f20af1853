use std::collections::HashSet;

use super::ContentError;
use crate::study::types::TopicModule;

pub fn from_json(raw: &str) -> Result<Vec<TopicModule>, ContentError> {
    let topics: Vec<TopicModule> = serde_json::from_str(raw)?;

    // Flashcards are keyed by topic and prompt, so prompts must be unique per topic.
    for topic in &topics {
        let mut prompts = HashSet::new();
        for card in &topic.flashcards {
            if !prompts.insert(card.prompt.as_str()) {
                return Err(ContentError::DuplicateFlashcard {
                    topic: topic.name.clone(),
                    prompt: card.prompt.clone(),
                });
            }
        }
    }

    Ok(topics)
}
