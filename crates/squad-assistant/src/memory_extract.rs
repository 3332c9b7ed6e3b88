//! Lightweight pattern extraction of durable user facts from chat turns.

use lazy_static::lazy_static;
use regex::Regex;

use crate::store::MemoryEntry;

const MAX_MEMORY_ROWS: usize = 5;
const MAX_VALUE_LEN: usize = 180;

lazy_static! {
    static ref NAME: Option<Regex> = Regex::new(r"(?i)\bmy name is ([a-z\s'-]{2,40})").ok();
    static ref GOAL: Option<Regex> = Regex::new(r"(?i)\bmy goal (?:is|=)\s*([^.!?]+)").ok();
    static ref FOCUS: Option<Regex> =
        Regex::new(r"(?i)\b(?:i am|i'm)\s+(?:studying|learning|building)\s+([^.!?]+)").ok();
    static ref TIMEZONE: Option<Regex> = Regex::new(r"(?i)\bmy timezone (?:is|=)\s*([^.!?]+)").ok();
    static ref LOCATION: Option<Regex> = Regex::new(r"(?i)\bi live in\s+([^.!?]+)").ok();
}

fn cleanup(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed: String = collapsed.chars().take(MAX_VALUE_LEN).collect();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn capture(pattern: &Option<Regex>, text: &str) -> Option<String> {
    pattern
        .as_ref()?
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| cleanup(m.as_str()))
}

/// Extract keyed facts from one message. First mention of a key wins;
/// at most five entries come back.
pub fn extract_memory_entries(text: &str) -> Vec<MemoryEntry> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut entries = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            if !entries.iter().any(|e: &MemoryEntry| e.key == key) {
                entries.push(MemoryEntry {
                    key: key.to_string(),
                    value,
                });
            }
        }
    };

    push("name", capture(&NAME, text));
    push("goal", capture(&GOAL, text));
    push("focus", capture(&FOCUS, text));
    push(
        "timezone",
        capture(&TIMEZONE, text).or_else(|| capture(&LOCATION, text)),
    );

    entries.truncate(MAX_MEMORY_ROWS);
    entries
}
