use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::content::Content;
use crate::engine::{self, StudyEngine};
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    engine: Arc<StudyEngine>,
    config: Arc<Config>,
    shutdown_tx: broadcast::Sender<()>,
    started_at: Instant,
    sse_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(
        store: Arc<Store>,
        content: Arc<Content>,
        config: &Config,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let engine = Arc::new(StudyEngine::new(
            store.clone(),
            content,
            config.study.clone(),
        ));

        Self {
            store,
            engine,
            config: Arc::new(config.clone()),
            shutdown_tx,
            started_at: Instant::now(),
            sse_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn engine(&self) -> &StudyEngine {
        &self.engine
    }

    /// Starts the idle session sweep. `None` when eviction is disabled.
    pub fn spawn_session_sweeper(&self) -> Option<JoinHandle<()>> {
        let idle_secs = self.config.study.session_idle_secs;
        if idle_secs == 0 {
            return None;
        }
        Some(tokio::spawn(engine::sweep_idle_sessions(
            self.engine.clone(),
            Duration::from_secs(idle_secs),
            self.shutdown_rx(),
        )))
    }

    pub fn content(&self) -> &Content {
        self.engine.content()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown_rx(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn shutdown_tx(&self) -> &broadcast::Sender<()> {
        &self.shutdown_tx
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Open SSE streams, shared by every clone of the state.
    pub fn sse_connections(&self) -> &Arc<AtomicUsize> {
        &self.sse_connections
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use crate::config::Config;
    use crate::content::Content;
    use crate::store::Store;

    use super::*;

    fn state(tx: broadcast::Sender<()>) -> (AppState, tempfile::TempDir) {
        let cfg = Config::from_env();
        let tmp = tempfile::tempdir().expect("tempdir");
        let store =
            Arc::new(Store::open(tmp.path().join("state.sled").to_str().unwrap()).unwrap());
        let content = Arc::new(Content::embedded().unwrap());
        (AppState::new(store, content, &cfg, tx), tmp)
    }

    #[tokio::test]
    async fn shutdown_receiver_can_clone() {
        let (tx, _) = broadcast::channel(4);
        let (state, _tmp) = state(tx.clone());

        let mut rx1 = state.shutdown_rx();
        let mut rx2 = state.shutdown_rx();
        tx.send(()).unwrap();
        rx1.recv().await.unwrap();
        rx2.recv().await.unwrap();
    }

    #[tokio::test]
    async fn content_is_shared_with_engine() {
        let (tx, _) = broadcast::channel(4);
        let (state, _tmp) = state(tx);
        assert_eq!(state.content().bank.questions.len(), 5);
        assert_eq!(state.engine().active_sessions().await, 0);
    }

    #[tokio::test]
    async fn session_sweeper_follows_config_and_shutdown() {
        let (tx, _) = broadcast::channel(4);
        let (mut state, _tmp) = state(tx.clone());

        let sweeper = state.spawn_session_sweeper().expect("sweeper enabled by default");
        tx.send(()).unwrap();
        sweeper.await.unwrap();

        let mut config = (*state.config).clone();
        config.study.session_idle_secs = 0;
        state.config = Arc::new(config);
        assert!(state.spawn_session_sweeper().is_none());
    }
}
