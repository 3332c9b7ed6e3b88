//! PII redaction applied to chat input and replies before persistence.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionStatus {
    Redacted,
    Skipped,
    Failed,
}

impl RedactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionStatus::Redacted => "redacted",
            RedactionStatus::Skipped => "skipped",
            RedactionStatus::Failed => "failed",
        }
    }

    /// Status for a log row covering two independent redaction passes:
    /// `failed` if either failed, else `redacted` if either changed the text,
    /// else `skipped`.
    pub fn combine(a: RedactionStatus, b: RedactionStatus) -> RedactionStatus {
        if a == RedactionStatus::Failed || b == RedactionStatus::Failed {
            RedactionStatus::Failed
        } else if a == RedactionStatus::Redacted || b == RedactionStatus::Redacted {
            RedactionStatus::Redacted
        } else {
            RedactionStatus::Skipped
        }
    }
}

#[derive(Debug, Clone)]
pub struct Redacted {
    pub value: String,
    pub status: RedactionStatus,
}

lazy_static! {
    static ref PATTERNS: Result<Vec<(Regex, &'static str)>, regex::Error> = build_patterns();
}

fn build_patterns() -> Result<Vec<(Regex, &'static str)>, regex::Error> {
    Ok(vec![
        (
            Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b")?,
            "email",
        ),
        (
            Regex::new(
                r"(?:(?:\+?\d{1,3}[-\s.]*)?(?:\(?\d{2,4}\)?[-\s.]*)?\d{3}[-\s.]?\d{2,4}[-\s.]?\d{2,4})",
            )?,
            "phone",
        ),
        (
            Regex::new(
                r"(?i)\b\d{1,4}\s+(?:[A-Za-z0-9]+\s){1,4}(?:street|st\.|road|rd\.|avenue|ave\.|drive|dr\.|lane|ln\.|boulevard|blvd\.|way)\b",
            )?,
            "address",
        ),
        (Regex::new(r"(?i)@[a-z0-9_]{5,}")?, "handle"),
    ])
}

/// Replace email / phone / street-address / handle substrings with placeholder
/// tags. Replacing an already-redacted string is a no-op on the placeholders,
/// so the pass is idempotent.
pub fn redact_for_storage(input: &str) -> Redacted {
    if input.is_empty() {
        return Redacted {
            value: String::new(),
            status: RedactionStatus::Skipped,
        };
    }

    let patterns = match PATTERNS.as_ref() {
        Ok(patterns) => patterns,
        Err(e) => {
            tracing::warn!("Redaction unavailable (pattern compile failed): {}", e);
            return Redacted {
                value: input.to_string(),
                status: RedactionStatus::Failed,
            };
        }
    };

    let mut next = input.to_string();
    let mut changed = false;
    for (pattern, label) in patterns {
        let replacement = format!("[redacted {}]", label);
        let replaced = pattern.replace_all(&next, replacement.as_str());
        if replaced != next {
            changed = true;
            next = replaced.into_owned();
        }
    }

    Redacted {
        value: next,
        status: if changed {
            RedactionStatus::Redacted
        } else {
            RedactionStatus::Skipped
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_redacted() {
        let out = redact_for_storage("reach me at alice@example.com please");
        assert_eq!(out.value, "reach me at [redacted email] please");
        assert_eq!(out.status, RedactionStatus::Redacted);
    }

    #[test]
    fn test_phone_redacted() {
        let out = redact_for_storage("call +1 415 555 0123");
        assert!(out.value.contains("[redacted phone]"));
        assert_eq!(out.status, RedactionStatus::Redacted);
    }

    #[test]
    fn test_address_redacted() {
        let out = redact_for_storage("I live at 12 Baker Street in town");
        assert!(out.value.contains("[redacted address]"));
    }

    #[test]
    fn test_handle_redacted() {
        let out = redact_for_storage("message @focus_fan99 about it");
        assert!(out.value.contains("[redacted handle]"));
    }

    #[test]
    fn test_clean_text_skipped() {
        let out = redact_for_storage("how do streaks work?");
        assert_eq!(out.value, "how do streaks work?");
        assert_eq!(out.status, RedactionStatus::Skipped);
    }

    #[test]
    fn test_empty_input_skipped() {
        let out = redact_for_storage("");
        assert_eq!(out.status, RedactionStatus::Skipped);
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let once = redact_for_storage("email alice@example.com and ping @focus_fan99");
        let twice = redact_for_storage(&once.value);
        // No double-wrapped placeholder tags.
        assert_eq!(once.value, twice.value);
        assert_eq!(twice.status, RedactionStatus::Skipped);
    }

    // ===== Combine Rule Tests =====

    #[test]
    fn test_combine_failed_dominates() {
        assert_eq!(
            RedactionStatus::combine(RedactionStatus::Redacted, RedactionStatus::Failed),
            RedactionStatus::Failed
        );
    }

    #[test]
    fn test_combine_redacted_over_skipped() {
        assert_eq!(
            RedactionStatus::combine(RedactionStatus::Skipped, RedactionStatus::Redacted),
            RedactionStatus::Redacted
        );
    }

    #[test]
    fn test_combine_both_skipped() {
        assert_eq!(
            RedactionStatus::combine(RedactionStatus::Skipped, RedactionStatus::Skipped),
            RedactionStatus::Skipped
        );
    }
}
