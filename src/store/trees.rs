pub const RESPONSES: &str = "responses";
pub const REVIEW_STATES: &str = "review_states";
pub const CONFIG_VERSIONS: &str = "config_versions";
