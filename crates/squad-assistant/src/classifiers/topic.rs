//! Topic routing: is this question about the product or about the world?
//!
//! The general-knowledge and focus-squad vocabularies are English-only by
//! product decision; non-English users reach the assistant through the
//! greeting and leaderboard paths, which are localized.

use lazy_static::lazy_static;

use crate::classifiers::patterns::PatternSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRoute {
    pub general_knowledge: bool,
    pub focus_squad: bool,
    pub leaderboard_intent: bool,
    /// `general_knowledge && !leaderboard_intent && !focus_squad` — in-domain
    /// signals always win over generic off-topic vocabulary.
    pub off_topic: bool,
}

lazy_static! {
    static ref GENERAL_KNOWLEDGE: PatternSet<()> = PatternSet::new(
        "general-knowledge",
        vec![
            (r"(?i)\b(what\s+is\s+the\s+capital|capital\s+of)\b", ()),
            (r"(?i)\b(definition|meaning)\s+of\b", ()),
            (r"(?i)\b(weather|forecast|temperature)\b", ()),
            (r"(?i)\b(president|election|politics|government|minister)\b", ()),
            (r"(?i)\b(celebrity|movie|film|actor|singer|netflix)\b", ()),
            (r"(?i)\b(football|soccer|basketball|olympics|champions\s+league)\b", ()),
            (r"(?i)\b(physics|chemistry|biology|astronomy|quantum)\b", ()),
            (r"(?i)\b(stock\s+market|bitcoin|crypto|exchange\s+rate|inflation)\b", ()),
            (r"(?i)\b(recipe|cook|translate)\b", ()),
            (r"(?i)\b(country|continent|planet|ocean|mountain)\b", ()),
            (r"(?i)\bhistory\s+of\b", ()),
        ],
    );
    static ref FOCUS_SQUAD: PatternSet<()> = PatternSet::new(
        "focus-squad",
        vec![
            (r"(?i)\b(dashboard|timer|pomodoro)\b", ()),
            (r"(?i)\bleaderboards?\b", ()),
            (r"(?i)\bstreaks?\b", ()),
            (r"(?i)\btasks?\b", ()),
            (r"(?i)\b(community|live\s+room|study\s+room)\b", ()),
            (r"(?i)\b(pricing|subscription|premium|account|sign\s*up|sign\s*in)\b", ()),
            (r"(?i)\b(minutes|points|focus\s+session)\b", ()),
            (r"(?i)\bfocus\s+squad\b", ()),
            (r"(?i)/(leaderboard|timer|tasks|community|assistant)\b", ()),
        ],
    );
}

/// Route a lower-cased, trimmed message.
///
/// `leaderboard_intent` comes from the leaderboard resolver's intent gate,
/// which is broader than the bare keyword (see the resolver).
pub fn route_topic(input: &str, leaderboard_intent: bool) -> TopicRoute {
    let general_knowledge = GENERAL_KNOWLEDGE.matches(input);
    let focus_squad = FOCUS_SQUAD.matches(input);
    TopicRoute {
        general_knowledge,
        focus_squad,
        leaderboard_intent,
        off_topic: general_knowledge && !leaderboard_intent && !focus_squad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_knowledge_is_off_topic() {
        let route = route_topic("what is the capital of france?", false);
        assert!(route.general_knowledge);
        assert!(route.off_topic);
    }

    #[test]
    fn test_in_domain_vocabulary_overrides_off_topic() {
        // Matches both "weather" (general) and "streak"/"dashboard" (in-domain).
        let route = route_topic("what's the weather for my streak dashboard", false);
        assert!(route.general_knowledge);
        assert!(route.focus_squad);
        assert!(!route.off_topic);
    }

    #[test]
    fn test_leaderboard_intent_overrides_off_topic() {
        let route = route_topic("who is the bitcoin president of the leaderboard", true);
        assert!(!route.off_topic);
    }

    #[test]
    fn test_product_question_is_in_domain() {
        let route = route_topic("how do i start a timer?", false);
        assert!(route.focus_squad);
        assert!(!route.off_topic);
    }

    #[test]
    fn test_neutral_question_is_not_off_topic() {
        // No general-knowledge vocabulary at all: let retrieval decide.
        let route = route_topic("how can i improve?", false);
        assert!(!route.off_topic);
    }
}
