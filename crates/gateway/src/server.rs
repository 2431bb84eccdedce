//! Router construction and server startup.

use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::State,
        response::IntoResponse,
        routing::{get, post},
    },
    tower_http::trace::TraceLayer,
    tracing::info,
};

use {
    gantry_bridge::{BridgeSettings, ResponseBridge},
    gantry_commands::{CommandRegistry, DeploymentInfoClient, ProcessRunner},
    gantry_config::GantryConfig,
};

use crate::{hooks, state::AppState};

/// Build the webhook router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/test-hook", post(hooks::test_hook))
        .route("/deploy", post(hooks::deploy))
        .route("/reload", post(hooks::reload))
        .route("/rollforward", post(hooks::rollforward))
        .route("/scheduler", post(hooks::scheduler))
        .route("/worker", post(hooks::worker))
        .route("/deployment-info", post(hooks::deployment_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire bridge, registry, and status client together from `config`.
pub fn build_state(config: GantryConfig) -> anyhow::Result<AppState> {
    let bridge = ResponseBridge::new(BridgeSettings::from(&config.bridge))?;
    let runner = Arc::new(ProcessRunner::new(config.remote.program.clone()));
    let registry = CommandRegistry::builtin(runner);
    let deployment_info = DeploymentInfoClient::new(config.bridge.callback_timeout())?;
    Ok(AppState {
        bridge: Arc::new(bridge),
        registry: Arc::new(registry),
        deployment_info: Arc::new(deployment_info),
        config: Arc::new(config),
    })
}

/// Start the webhook server and block until it exits.
pub async fn start_server(config: GantryConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = build_state(config)?;
    let app = build_app(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %listener.local_addr()?,
        commands = ?state.registry.names(),
        "gantry listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "commands": state.registry.names(),
    }))
}
