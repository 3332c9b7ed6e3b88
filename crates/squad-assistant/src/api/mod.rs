//! API module - HTTP surface for the assistant pipeline

pub mod admin_api;
pub mod chat_api;

pub use admin_api::{admin_chats, admin_toggle, admin_toggle_status};
pub use chat_api::{chat, chat_status, get_preference, rate_chat, set_preference, ChatBody, ChatResponse};
