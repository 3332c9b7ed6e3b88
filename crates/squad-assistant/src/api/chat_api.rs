//! API endpoints for the chat pipeline: the main turn endpoint plus
//! status, rating, and memory preference management.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::metrics;
use crate::pipeline::{handle_chat, ChatRequest};
use crate::shared_state::SharedState;

const MAX_INPUT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub input: String,
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub text: String,
    pub used_rag: bool,
    pub language: &'static str,
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Every chat response carries a no-store directive; replies can quote
/// user data and must never land in shared caches.
fn no_store(status: StatusCode, body: impl Serialize) -> Response {
    (
        status,
        [(header::CACHE_CONTROL, "no-store")],
        Json(serde_json::to_value(body).unwrap_or_default()),
    )
        .into_response()
}

fn bad_request(error: &'static str) -> Response {
    metrics::inc_request("/api/chat", "400");
    no_store(StatusCode::BAD_REQUEST, ErrorBody { error })
}

fn client_ip(headers: &HeaderMap, addr: &SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// POST /api/chat
pub async fn chat(
    State(state): State<Arc<SharedState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Response {
    let input = body.input.trim();
    if input.is_empty() || input.chars().count() > MAX_INPUT_CHARS {
        return bad_request("invalid input");
    }
    if Uuid::parse_str(&body.session_id).is_err() {
        return bad_request("invalid session id");
    }
    if let Some(user_id) = &body.user_id {
        if Uuid::parse_str(user_id).is_err() {
            return bad_request("invalid user id");
        }
    }

    let ip = client_ip(&headers, &addr);
    if !state.rate_limiter.check(&body.session_id, &ip) {
        metrics::inc_request("/api/chat", "429");
        return no_store(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorBody {
                error: "rate limited",
            },
        );
    }

    let outcome = handle_chat(
        state,
        ChatRequest {
            message: input.to_string(),
            session_id: body.session_id,
            user_id: body.user_id,
        },
    )
    .await;

    let status = if outcome.is_paused() {
        StatusCode::SERVICE_UNAVAILABLE
    } else if outcome.is_failure() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    metrics::inc_request("/api/chat", status.as_str());
    metrics::inc_branch(outcome.branch);
    metrics::inc_redaction(outcome.redaction_status.as_str());

    no_store(
        status,
        ChatResponse {
            text: outcome.reply,
            used_rag: outcome.used_rag,
            language: outcome.language.as_str(),
            chat_id: outcome.log_id,
        },
    )
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    enabled: bool,
}

/// GET /api/chat/status
pub async fn chat_status(State(state): State<Arc<SharedState>>) -> Response {
    no_store(
        StatusCode::OK,
        StatusResponse {
            enabled: state.is_enabled(),
        },
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBody {
    pub chat_id: String,
    pub rating: i32,
}

/// POST /api/chat/rating
pub async fn rate_chat(
    State(state): State<Arc<SharedState>>,
    Json(body): Json<RatingBody>,
) -> Response {
    if body.rating != 1 && body.rating != -1 {
        return no_store(
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "rating must be 1 or -1",
            },
        );
    }
    match state.database.chat_logs.update_rating(&body.chat_id, body.rating) {
        Ok(true) => no_store(StatusCode::OK, serde_json::json!({ "ok": true })),
        Ok(false) => no_store(
            StatusCode::NOT_FOUND,
            ErrorBody {
                error: "unknown chat id",
            },
        ),
        Err(e) => {
            tracing::error!("Failed to store rating: {}", e);
            no_store(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "failed to store rating",
                },
            )
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceResponse {
    memory_enabled: bool,
}

/// GET /api/chat/preferences
pub async fn get_preference(
    State(state): State<Arc<SharedState>>,
    Query(query): Query<PreferenceQuery>,
) -> Response {
    no_store(
        StatusCode::OK,
        PreferenceResponse {
            memory_enabled: state.database.memories.preference(&query.user_id),
        },
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceBody {
    pub user_id: String,
    pub memory_enabled: bool,
}

/// POST /api/chat/preferences
pub async fn set_preference(
    State(state): State<Arc<SharedState>>,
    Json(body): Json<PreferenceBody>,
) -> Response {
    if Uuid::parse_str(&body.user_id).is_err() {
        return no_store(
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: "invalid user id",
            },
        );
    }
    match state
        .database
        .memories
        .set_preference(&body.user_id, body.memory_enabled)
    {
        Ok(()) => {
            info!(
                "Memory preference for {} set to {}",
                body.user_id, body.memory_enabled
            );
            no_store(
                StatusCode::OK,
                PreferenceResponse {
                    memory_enabled: body.memory_enabled,
                },
            )
        }
        Err(e) => {
            tracing::error!("Failed to store preference: {}", e);
            no_store(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "failed to store preference",
                },
            )
        }
    }
}
