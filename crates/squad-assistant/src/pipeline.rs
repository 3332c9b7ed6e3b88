//! The conversational pipeline: an ordered chain of cheap classifiers in
//! front of retrieval and generation. Every stage either resolves the
//! request or hands it to the next one, and every resolved branch leaves
//! exactly one chat log row behind.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use crate::classifiers::{classify_refusal, detect_greeting, route_topic, RefusalClassification};
use crate::collaborators::GenerationRequest;
use crate::language::{detect_language, LanguageDetection, SupportedLanguage};
use crate::leaderboard::{resolve, ResolverOutcome};
use crate::memory_extract::extract_memory_entries;
use crate::redaction::{redact_for_storage, RedactionStatus};
use crate::replies;
use crate::retrieval::{gate_matches, TOP_K};
use crate::shared_state::SharedState;
use crate::store::memory_store::MEMORY_CONTEXT_LIMIT;
use crate::store::ChatLogInsert;

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: String,
    pub language: SupportedLanguage,
    pub branch: &'static str,
    pub used_rag: bool,
    pub redaction_status: RedactionStatus,
    pub log_id: Option<String>,
}

impl ChatOutcome {
    pub fn is_paused(&self) -> bool {
        self.branch == "paused"
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.branch, "collaborator_error" | "pipeline_error")
    }
}

/// Named points where the enabled flag is re-read. Cooperative pause:
/// an operator flip takes effect at the next checkpoint, never mid-call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Checkpoint {
    BeforeRetrieval,
    BeforeGeneration,
    AfterGeneration,
}

fn assistant_paused(state: &SharedState, checkpoint: Checkpoint) -> bool {
    if state.is_enabled() {
        return false;
    }
    debug!("Assistant paused at checkpoint {:?}", checkpoint);
    true
}

/// One resolved branch, before redaction and logging.
struct Resolution {
    reply: String,
    branch: &'static str,
    used_rag: bool,
    metadata: serde_json::Value,
}

impl Resolution {
    fn terminal(reply: String, branch: &'static str) -> Self {
        Self {
            reply,
            branch,
            used_rag: false,
            metadata: json!({}),
        }
    }
}

/// Run one chat turn end to end. Never fails outward: any error the
/// stages did not absorb becomes a fixed English reply, deliberately
/// not localized because the detection itself may be what broke.
pub async fn handle_chat(state: Arc<SharedState>, request: ChatRequest) -> ChatOutcome {
    let detection = detect_language(&request.message);
    let resolution = match run_stages(&state, &request, &detection).await {
        Ok(resolution) => resolution,
        Err(e) => {
            warn!("Chat pipeline failed unexpectedly: {:#}", e);
            Resolution {
                reply: replies::GENERIC_FAILURE.to_string(),
                branch: "pipeline_error",
                used_rag: false,
                metadata: json!({ "error": e.to_string() }),
            }
        }
    };
    finalize(&state, &request, &detection, resolution)
}

async fn run_stages(
    state: &Arc<SharedState>,
    request: &ChatRequest,
    detection: &LanguageDetection,
) -> anyhow::Result<Resolution> {
    let language = detection.code;
    let normalized = request.message.trim().to_lowercase();

    // Greetings answer even while the assistant is paused. The reply pool
    // follows the matched greeting's language, not the overall detection:
    // "hello reja qanday" greets back in English.
    if let Some(greeting_language) = detect_greeting(&normalized) {
        let reply = state.greeting_rotation.next_reply(greeting_language);
        return Ok(Resolution::terminal(reply, "greeting"));
    }

    let verdict = state.moderation.review(&request.message).await;
    if !verdict.allowed {
        return Ok(Resolution {
            reply: replies::moderation_reply(language),
            branch: "moderation",
            used_rag: false,
            metadata: json!({
                "reason": verdict.reason,
                "category": verdict.category,
            }),
        });
    }

    match classify_refusal(&normalized) {
        RefusalClassification::Personal => {
            return Ok(Resolution::terminal(
                replies::refusal_personal_reply(language),
                "refusal_personal",
            ));
        }
        RefusalClassification::Admin => {
            return Ok(Resolution::terminal(
                replies::refusal_admin_reply(language),
                "refusal_admin",
            ));
        }
        RefusalClassification::None => {}
    }

    let today = Utc::now().date_naive();
    let leaderboard_intent = match resolve(
        &normalized,
        today,
        language,
        &state.database.snapshots,
    ) {
        ResolverOutcome::Handled {
            text,
            reason,
            metadata,
        } => {
            return Ok(Resolution {
                reply: text,
                branch: reason,
                used_rag: false,
                metadata,
            });
        }
        ResolverOutcome::NotHandled => false,
    };

    let route = route_topic(&normalized, leaderboard_intent);
    if route.off_topic {
        return Ok(Resolution::terminal(
            replies::off_topic_reply(language),
            "off_topic",
        ));
    }

    if assistant_paused(state, Checkpoint::BeforeRetrieval) {
        return Ok(Resolution::terminal(replies::paused_reply(language), "paused"));
    }

    let outcome = match retrieve(state, &request.message).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Retrieval failed: {:#}", e);
            return Ok(Resolution {
                reply: replies::error_reply(language),
                branch: "collaborator_error",
                used_rag: false,
                metadata: json!({ "stage": "retrieval", "error": e.to_string() }),
            });
        }
    };

    if !outcome.confident {
        return Ok(Resolution {
            reply: replies::off_topic_reply(language),
            branch: "low_confidence",
            used_rag: false,
            metadata: json!({
                "matches": outcome.snippets.len(),
                "best_score": outcome.best_score(),
            }),
        });
    }

    if assistant_paused(state, Checkpoint::BeforeGeneration) {
        return Ok(Resolution::terminal(replies::paused_reply(language), "paused"));
    }

    let memory = load_memory(state, request.user_id.as_deref());
    let generation_request = GenerationRequest {
        question: request.message.clone(),
        language,
        contexts: outcome.snippets.iter().map(|s| s.meta.clone()).collect(),
        memory,
    };
    let answer = match state.generation.generate(&generation_request).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!("Generation failed: {:#}", e);
            return Ok(Resolution {
                reply: replies::error_reply(language),
                branch: "collaborator_error",
                used_rag: false,
                metadata: json!({ "stage": "generation", "error": e.to_string() }),
            });
        }
    };

    // The flag may have flipped while generation was in flight; the
    // generated text is discarded in that case.
    if assistant_paused(state, Checkpoint::AfterGeneration) {
        return Ok(Resolution::terminal(replies::paused_reply(language), "paused"));
    }

    spawn_memory_extraction(state, request);

    Ok(Resolution {
        reply: answer,
        branch: "rag_answer",
        used_rag: true,
        metadata: json!({
            "matches": outcome.snippets.len(),
            "best_score": outcome.best_score(),
        }),
    })
}

async fn retrieve(
    state: &Arc<SharedState>,
    message: &str,
) -> anyhow::Result<crate::retrieval::RetrievalOutcome> {
    let vector = state.embeddings.embed(message).await?;
    if vector.is_empty() {
        anyhow::bail!("embedding service returned an empty vector");
    }
    let matches = state.vector_index.query(&vector, TOP_K).await?;
    Ok(gate_matches(matches))
}

/// Stored memories for the prompt. Consent lookups and fetch errors
/// both degrade to an empty list.
fn load_memory(state: &Arc<SharedState>, user_id: Option<&str>) -> Vec<String> {
    let Some(user_id) = user_id else {
        return Vec::new();
    };
    if !state.database.memories.preference(user_id) {
        return Vec::new();
    }
    match state.database.memories.list(user_id, MEMORY_CONTEXT_LIMIT) {
        Ok(entries) => entries
            .into_iter()
            .map(|e| format!("{}: {}", e.key, e.value))
            .collect(),
        Err(e) => {
            warn!("Failed to load memories for {}: {}", user_id, e);
            Vec::new()
        }
    }
}

/// Fire-and-forget: extraction runs off the response path and its
/// failures only warn.
fn spawn_memory_extraction(state: &Arc<SharedState>, request: &ChatRequest) {
    let Some(user_id) = request.user_id.clone() else {
        return;
    };
    if !state.database.memories.preference(&user_id) {
        return;
    }
    let entries = extract_memory_entries(&request.message);
    if entries.is_empty() {
        return;
    }
    let state = Arc::clone(state);
    tokio::spawn(async move {
        if let Err(e) = state.database.memories.upsert(&user_id, &entries) {
            warn!("Failed to upsert memories for {}: {}", user_id, e);
        }
    });
}

/// Redact, persist, and shape the final outcome. A failed log insert
/// never fails the response; the chat id is simply absent.
fn finalize(
    state: &Arc<SharedState>,
    request: &ChatRequest,
    detection: &LanguageDetection,
    resolution: Resolution,
) -> ChatOutcome {
    let input = redact_for_storage(&request.message);
    let reply = redact_for_storage(&resolution.reply);
    let status = RedactionStatus::combine(input.status, reply.status);

    let mut metadata = resolution.metadata;
    if let Some(map) = metadata.as_object_mut() {
        map.insert("branch".to_string(), json!(resolution.branch));
        map.insert(
            "language".to_string(),
            json!({
                "code": detection.code.as_str(),
                "raw": detection.raw,
                "confidence": detection.confidence,
            }),
        );
    }

    let log_id = match state.database.chat_logs.insert(ChatLogInsert {
        user_id: request.user_id.clone(),
        session_id: request.session_id.clone(),
        language: detection.code.as_str().to_string(),
        input: input.value,
        reply: reply.value,
        used_rag: resolution.used_rag,
        redaction_status: status.as_str().to_string(),
        metadata,
    }) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Failed to persist chat log: {}", e);
            None
        }
    };

    ChatOutcome {
        reply: resolution.reply,
        language: detection.code,
        branch: resolution.branch,
        used_rag: resolution.used_rag,
        redaction_status: status,
        log_id,
    }
}
