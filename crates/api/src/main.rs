use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use magima_api::config::ServerConfig;
use magima_api::jobs::{GeneratorRunner, InMemoryJobStore, JobTracker};
use magima_api::router::build_app_router;
use magima_api::state::AppState;
use magima_pipeline::{PipelineConfig, VideoGenerator};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "magima_api=debug,magima_pipeline=debug,magima_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        default_preset = %config.default_preset,
        output_dir = %config.output_dir.display(),
        model_server = %pipeline_config.model_server_url,
        "Loaded server configuration",
    );

    // --- Generation pipeline ---
    let generator = Arc::new(VideoGenerator::from_config(&pipeline_config));
    let engine = Arc::clone(generator.engine());

    if config.preload_model {
        match engine.ensure_loaded().await {
            Ok(()) => tracing::info!("Video model preloaded"),
            Err(e) => tracing::error!(
                error = %e,
                "Video model preload failed, loading will be retried on first request",
            ),
        }
    }

    // --- Jobs ---
    let runner = GeneratorRunner::new(Arc::clone(&generator), config.output_dir.clone());
    let tracker = Arc::new(JobTracker::new(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(runner),
    ));

    // --- App state & router ---
    let state = AppState::new(&config, tracker, engine);
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). Jobs still running
/// when the signal arrives are abandoned.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
