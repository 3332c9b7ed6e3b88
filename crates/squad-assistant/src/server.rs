//! HTTP server wiring: builds the shared state, mounts the API routes,
//! and serves until shutdown.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::shared_state::SharedState;
use crate::store::AssistantDatabase;

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::telemetry::init_tracing();
    crate::metrics::init_metrics();
    cfg.print_config();

    let database = match AssistantDatabase::new(&cfg.database_path) {
        Ok(db) => {
            info!("Assistant database ready at: {}", cfg.database_path.display());
            Arc::new(db)
        }
        Err(e) => {
            warn!("Failed to open database: {}. Falling back to in-memory.", e);
            Arc::new(AssistantDatabase::new_in_memory()?)
        }
    };

    let state = Arc::new(SharedState::new(cfg.clone(), database));

    info!("Starting HTTP server on {}", cfg.api_addr());
    let listener = tokio::net::TcpListener::bind(cfg.api_addr()).await?;
    let app = build_router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// GET /healthz
///
/// Liveness plus a cheap readiness sketch: whether the collaborators are
/// configured at all. It never calls out to them.
async fn health(
    axum::extract::State(state): axum::extract::State<Arc<SharedState>>,
) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "assistantEnabled": state.is_enabled(),
        "openaiConfigured": !state.config.openai_api_key.is_empty(),
        "vectorConfigured": !state.config.vector_url.is_empty(),
    }))
}

fn build_router(state: Arc<SharedState>) -> axum::Router {
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::time::Duration;
    use tower_http::{
        cors::{Any, CorsLayer},
        timeout::TimeoutLayer,
        trace::TraceLayer,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(crate::api::chat_api::chat))
        .route("/api/chat/status", get(crate::api::chat_api::chat_status))
        .route("/api/chat/rating", post(crate::api::chat_api::rate_chat))
        .route(
            "/api/chat/preferences",
            get(crate::api::chat_api::get_preference).post(crate::api::chat_api::set_preference),
        )
        .route(
            "/api/admin/toggle",
            get(crate::api::admin_api::admin_toggle_status)
                .post(crate::api::admin_api::admin_toggle),
        )
        .route("/api/admin/chats", get(crate::api::admin_api::admin_chats))
        .route("/metrics", get(crate::metrics::get_metrics))
        .route("/healthz", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(75)))
        .with_state(state)
}
