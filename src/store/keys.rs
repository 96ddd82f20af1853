use super::StoreError;
use crate::validation::validate_learner_id;

fn learner_key(learner_id: &str) -> Result<String, StoreError> {
    validate_learner_id(learner_id).map_err(|msg| StoreError::Validation(msg.to_string()))?;
    Ok(learner_id.to_string())
}

pub fn responses_key(learner_id: &str) -> Result<String, StoreError> {
    learner_key(learner_id)
}

pub fn review_states_key(learner_id: &str) -> Result<String, StoreError> {
    learner_key(learner_id)
}
