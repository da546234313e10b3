use std::sync::Arc;

use claude_bridge::api::router;
use claude_bridge::config::{load_config, AppConfig};
use claude_bridge::observability::init_tracing;
use claude_bridge::state::AppState;

const CONFIG_PATH: &str = "config.yaml";

fn main() {
    let config = load_config(CONFIG_PATH).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {e}");
        eprintln!("Fix 'config.yaml' or remove it to run with defaults (see config.example.yaml).");
        std::process::exit(1);
    });

    init_tracing(&config.features.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to initialize Tokio runtime: {e}");
            std::process::exit(1);
        });

    runtime.block_on(run(config));
}

async fn run(config: AppConfig) {
    let host = config.server.host.clone();
    let port = config.server.port;

    tracing::info!(
        "claude-bridge starting on {}:{} (backend command: {})",
        host,
        port,
        config.backend.command
    );
    tracing::info!(
        "point clients at ANTHROPIC_API_BASE=http://{}:{} with any API key",
        host,
        port
    );

    let state = Arc::new(AppState::new(config));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .unwrap_or_else(|err| {
            eprintln!("Failed to bind to {host}:{port}: {err}");
            std::process::exit(1);
        });

    tracing::info!("claude-bridge is ready to accept connections");

    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}
