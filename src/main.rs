use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use cfa_study_backend::config::Config;
use cfa_study_backend::content::Content;
use cfa_study_backend::logging::{init_tracing, LogConfig};
use cfa_study_backend::routes::build_router;
use cfa_study_backend::state::AppState;
use cfa_study_backend::store::Store;
use tokio::sync::broadcast;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    if let Err(e) = init_tracing(&LogConfig::from(&config)) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("Starting cfa-study-backend");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(message) => {
            tracing::error!(error = %message, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), String> {
    let content = Arc::new(
        Content::embedded().map_err(|e| format!("Failed to load study content: {e}"))?,
    );

    let store = Arc::new(
        Store::open(&config.sled_path)
            .map_err(|e| format!("Failed to open sled database at {}: {e}", config.sled_path))?,
    );
    store
        .run_migrations()
        .map_err(|e| format!("Failed to run migrations: {e}"))?;

    let (shutdown_tx, _) = broadcast::channel::<()>(8);
    let state = AppState::new(store.clone(), content, &config, shutdown_tx.clone());
    let sweeper = state.spawn_session_sweeper();

    let cors_layer = build_cors_layer(&config)?;

    let app = build_router(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    tracing::info!(%addr, "Listening");

    let server = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()));

    if let Err(e) = server.await {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    let _ = shutdown_tx.send(());
    if let Some(sweeper) = sweeper {
        if let Err(e) = sweeper.await {
            tracing::warn!(error = %e, "Session sweeper ended abnormally");
        }
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    Ok(())
}

fn build_cors_layer(config: &Config) -> Result<CorsLayer, String> {
    let layer = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods(Any);

    if config.cors_origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    config
        .cors_origin
        .parse::<HeaderValue>()
        .map(|origin| layer.allow_origin(origin))
        .map_err(|e| format!("Invalid CORS_ORIGIN '{}': {e}", config.cors_origin))
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl-C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
}
