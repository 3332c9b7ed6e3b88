//! Refusal classification: questions the assistant declines to answer.
//!
//! Two pattern sets with an explicit precedence rule: the personal-data set is
//! always evaluated before the admin-topic set, and the first match of either
//! short-circuits the pipeline.

use lazy_static::lazy_static;

use crate::classifiers::patterns::PatternSet;

/// Mutually exclusive with every other classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalClassification {
    None,
    Personal,
    Admin,
}

lazy_static! {
    static ref PERSONAL_DATA: PatternSet<()> = PatternSet::new(
        "refusal-personal",
        vec![
            // first-person stats/streak/minutes questions
            (r"(?i)\bmy\s+(stats|statistics|streaks?|minutes|rank|points|score|data)\b", ()),
            (r"(?i)\b(show|tell|give)\s+me\s+my\b", ()),
            // first-person possessive + contact data
            (r"(?i)\bmy\s+(email|e-mail|phone|address|password)\b", ()),
            (r"(?i)\b(мо[йяи]|сво[йяи])\s+(статистик\w*|стрик\w*|минут\w*|почт\w*|телефон\w*|парол\w*)", ()),
            (r"(?i)\bmening\s+(statistikam|strikim|daqiqalarim|emailim|telefonim|parolim)\b", ()),
            (r"(?i)\bменя\s+в\s+(рейтинге|лидерборде)\b", ()),
        ],
    );
    static ref ADMIN_TOPIC: PatternSet<()> = PatternSet::new(
        "refusal-admin",
        vec![
            (r"(?i)\badmin\s+(panel|page|route|dashboard|password|access)\b", ()),
            (r"(?i)\b(secret|api)\s*key\b", ()),
            (r"(?i)\b(env|environment)\s+(var|variable|file)\b", ()),
            (r"(?i)\binternal\s+(config|configuration|endpoint|api)\b", ()),
            (r"(?i)\b(supabase|upstash|vercel|openai)\b", ()),
            (r"(?i)/api/admin\b", ()),
            (r"(?i)\b(админ\w*|секрет\w*)\s+(панел\w*|ключ\w*|доступ\w*)", ()),
            (r"(?i)\badmin\s+(paneli|paroli|kaliti)\b", ()),
        ],
    );
}

/// Personal-data patterns first, then admin-topic; first match of either wins.
/// The ordering is a precedence rule, not incidental.
pub fn classify_refusal(input: &str) -> RefusalClassification {
    if PERSONAL_DATA.matches(input) {
        return RefusalClassification::Personal;
    }
    if ADMIN_TOPIC.matches(input) {
        return RefusalClassification::Admin;
    }
    RefusalClassification::None
}
