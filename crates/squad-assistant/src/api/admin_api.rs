//! Admin endpoints: the assistant kill switch and the chat log browser.
//! Both sit behind a static bearer token; an unset token disables them.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::shared_state::SharedState;
use crate::store::ListChatLogsOptions;

fn authorized(state: &SharedState, headers: &HeaderMap) -> bool {
    if state.config.admin_token.is_empty() {
        return false;
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token == state.config.admin_token)
        .unwrap_or(false)
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "error": "forbidden" })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    enabled: bool,
}

/// GET /api/admin/toggle
pub async fn admin_toggle_status(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return forbidden();
    }
    (
        StatusCode::OK,
        Json(ToggleResponse {
            enabled: state.is_enabled(),
        }),
    )
        .into_response()
}

/// POST /api/admin/toggle
pub async fn admin_toggle(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
    Json(body): Json<ToggleBody>,
) -> Response {
    if !authorized(&state, &headers) {
        warn!("Rejected unauthorized assistant toggle");
        return forbidden();
    }
    state.set_enabled(body.enabled);
    info!("Assistant toggled to enabled={}", body.enabled);
    (
        StatusCode::OK,
        Json(ToggleResponse {
            enabled: state.is_enabled(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub used_rag: Option<bool>,
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// GET /api/admin/chats
pub async fn admin_chats(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
    Query(query): Query<ChatListQuery>,
) -> Response {
    if !authorized(&state, &headers) {
        warn!("Rejected unauthorized chat log listing");
        return forbidden();
    }
    let options = ListChatLogsOptions {
        user_id: query.user_id,
        used_rag: query.used_rag,
        since: query.since,
        until: query.until,
        limit: query.limit,
        cursor: query.cursor,
    };
    match state.database.chat_logs.list(options) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            warn!("Failed to list chat logs: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "invalid cursor" })),
            )
                .into_response()
        }
    }
}
