//! Conversational query pipeline for the Focus Squad dashboard.
//!
//! The core is a linear chain of cheap classifiers (language, greeting,
//! safety, topic, leaderboard NLU) in front of confidence-gated retrieval
//! and answer synthesis, with redacted chat logging on every branch. The
//! HTTP surface lives behind the `cli` feature.

pub mod classifiers;
pub mod collaborators;
pub mod config;
pub mod language;
pub mod leaderboard;
pub mod memory_extract;
pub mod pipeline;
pub mod rate_limit;
pub mod redaction;
pub mod replies;
pub mod retrieval;
pub mod shared_state;
pub mod store;
pub mod telemetry;

#[cfg(feature = "cli")]
pub mod api;
#[cfg(feature = "cli")]
pub mod metrics;
#[cfg(feature = "cli")]
pub mod server;

// Public API exports
pub use config::Config;
pub use language::{detect_language, LanguageDetection, SupportedLanguage};
pub use pipeline::{handle_chat, ChatOutcome, ChatRequest};
pub use shared_state::SharedState;
pub use store::AssistantDatabase;

#[cfg(feature = "cli")]
pub use server::run_server;
