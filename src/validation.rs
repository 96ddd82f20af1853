/// Shared input checks for path and query parameters.
use crate::constants::MAX_LEARNER_ID_LEN;

/// Learner ids become sled keys verbatim: 1-64 characters of `[A-Za-z0-9_-]`.
pub fn validate_learner_id(learner_id: &str) -> Result<(), &'static str> {
    if learner_id.is_empty() || learner_id.len() > MAX_LEARNER_ID_LEN {
        return Err("learner id must be between 1 and 64 characters");
    }
    if !learner_id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err("learner id may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Resolves an optional `?limit=` against a default and an upper bound.
/// Zero is kept as zero.
pub fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.unwrap_or(default).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learner_id_rules() {
        assert!(validate_learner_id("alice").is_ok());
        assert!(validate_learner_id("A_b-9").is_ok());
        assert!(validate_learner_id(&"x".repeat(64)).is_ok());
        assert!(validate_learner_id("").is_err());
        assert!(validate_learner_id(&"x".repeat(65)).is_err());
        assert!(validate_learner_id("a:b").is_err());
        assert!(validate_learner_id("名字").is_err());
    }

    #[test]
    fn limits_clamp_to_max() {
        assert_eq!(clamp_limit(None, 10, 100), 10);
        assert_eq!(clamp_limit(Some(3), 10, 100), 3);
        assert_eq!(clamp_limit(Some(1_000), 10, 100), 100);
        assert_eq!(clamp_limit(Some(0), 10, 100), 0);
    }
}
