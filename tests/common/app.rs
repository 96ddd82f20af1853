use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use cfa_study_backend::config::{Config, LimitsConfig, StudyConfig};
use cfa_study_backend::content::Content;
use cfa_study_backend::routes::build_router;
use cfa_study_backend::state::AppState;
use cfa_study_backend::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    pub shutdown_tx: broadcast::Sender<()>,
    pub temp_dir: TempDir,
}

/// Config built directly rather than through env vars, so parallel tests do
/// not race on the process environment.
pub fn test_config(sled_path: &str) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path: sled_path.to_string(),
        cors_origin: "http://localhost:5173".to_string(),
        study: StudyConfig::default(),
        limits: LimitsConfig::default(),
    }
}

pub fn build_app(config: &Config) -> (Router, AppState, broadcast::Sender<()>) {
    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");
    let content = Arc::new(Content::embedded().expect("embedded content"));

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(store, content, config, shutdown_tx.clone());
    (build_router(state.clone()), state, shutdown_tx)
}

pub async fn spawn_with_config(tweak: impl FnOnce(&mut Config)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("cfa-study-test.sled");
    let mut config = test_config(&sled_path.to_string_lossy());
    tweak(&mut config);

    let (app, state, shutdown_tx) = build_app(&config);
    TestApp {
        app,
        state,
        config,
        shutdown_tx,
        temp_dir,
    }
}

pub async fn spawn_test_server() -> TestApp {
    spawn_with_config(|_| {}).await
}
