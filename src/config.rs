use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::study::recommend::RecommendationSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub study: StudyConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone)]
pub struct StudyConfig {
    pub recent_responses_limit: usize,
    pub recommendation_accuracy_threshold: f64,
    pub max_recommendations: usize,
    pub strength_min_attempts: u32,
    /// Idle time before a learner session is evicted. `0` keeps sessions.
    pub session_idle_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_sse_connections: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        let settings = RecommendationSettings::default();
        Self {
            recent_responses_limit: 10,
            recommendation_accuracy_threshold: settings.accuracy_threshold,
            max_recommendations: settings.max_recommendations,
            strength_min_attempts: settings.strength_min_attempts,
            session_idle_secs: 1800,
        }
    }
}

impl StudyConfig {
    pub fn recommendation_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            accuracy_threshold: self.recommendation_accuracy_threshold,
            max_recommendations: self.max_recommendations,
            strength_min_attempts: self.strength_min_attempts,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sse_connections: 32,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let study_defaults = StudyConfig::default();
        let limit_defaults = LimitsConfig::default();

        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/cfa-study.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            study: StudyConfig {
                recent_responses_limit: env_or_parse(
                    "RECENT_RESPONSES_LIMIT",
                    study_defaults.recent_responses_limit,
                ),
                recommendation_accuracy_threshold: env_or_parse(
                    "RECOMMENDATION_ACCURACY_THRESHOLD",
                    study_defaults.recommendation_accuracy_threshold,
                ),
                max_recommendations: env_or_parse(
                    "MAX_RECOMMENDATIONS",
                    study_defaults.max_recommendations,
                ),
                strength_min_attempts: env_or_parse(
                    "STRENGTH_MIN_ATTEMPTS",
                    study_defaults.strength_min_attempts,
                ),
                session_idle_secs: env_or_parse(
                    "SESSION_IDLE_SECS",
                    study_defaults.session_idle_secs,
                ),
            },
            limits: LimitsConfig {
                max_sse_connections: env_or_parse(
                    "MAX_SSE_CONNECTIONS",
                    limit_defaults.max_sse_connections,
                ),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "SLED_PATH",
            "ENABLE_FILE_LOGS",
            "RECENT_RESPONSES_LIMIT",
            "RECOMMENDATION_ACCURACY_THRESHOLD",
            "MAX_RECOMMENDATIONS",
            "MAX_SSE_CONNECTIONS",
            "SESSION_IDLE_SECS",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.sled_path, "./data/cfa-study.sled");
        assert_eq!(cfg.study.recent_responses_limit, 10);
        assert_eq!(cfg.study.max_recommendations, 5);
        assert_eq!(cfg.limits.max_sse_connections, 32);
        assert_eq!(cfg.study.session_idle_secs, 1800);
        assert!((cfg.study.recommendation_accuracy_threshold - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("RECENT_RESPONSES_LIMIT", "25");
        env::set_var("RECOMMENDATION_ACCURACY_THRESHOLD", "0.65");
        env::set_var("SESSION_IDLE_SECS", "120");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.study.session_idle_secs, 120);
        assert_eq!(cfg.study.recent_responses_limit, 25);
        assert!((cfg.study.recommendation_accuracy_threshold - 0.65).abs() < f64::EPSILON);
        clear_keys(managed_keys());
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("MAX_RECOMMENDATIONS", "x");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.study.max_recommendations, 5);
        clear_keys(managed_keys());
    }

    #[test]
    fn bool_flags_accept_common_spellings() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("ENABLE_FILE_LOGS", "yes");
        assert!(Config::from_env().enable_file_logs);
        env::set_var("ENABLE_FILE_LOGS", "maybe");
        assert!(!Config::from_env().enable_file_logs);
        clear_keys(managed_keys());
    }

    #[test]
    fn recommendation_settings_follow_study_config() {
        let study = StudyConfig {
            max_recommendations: 2,
            ..StudyConfig::default()
        };
        let settings = study.recommendation_settings();
        assert_eq!(settings.max_recommendations, 2);
        assert_eq!(settings.strength_min_attempts, 2);
    }
}
