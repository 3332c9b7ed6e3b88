//! Retrieval gate: turns raw vector matches into validated, ranked
//! context and decides whether they are strong enough to answer from.

use serde_json::Value;

use crate::collaborators::{RawMatch, SnippetMeta};

pub const TOP_K: u32 = 5;
pub const CONFIDENCE_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone)]
pub struct ScoredSnippet {
    pub score: f64,
    pub meta: SnippetMeta,
}

#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub snippets: Vec<ScoredSnippet>,
    pub confident: bool,
}

impl RetrievalOutcome {
    pub fn empty() -> Self {
        Self {
            snippets: Vec::new(),
            confident: false,
        }
    }

    pub fn best_score(&self) -> Option<f64> {
        self.snippets.first().map(|s| s.score)
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// A match is usable only when its score is a finite number and its
/// metadata carries both a chunk and a url.
fn validate(raw: RawMatch) -> Option<ScoredSnippet> {
    let score = raw.score.filter(|s| s.is_finite())?;
    let chunk = non_empty_string(raw.metadata.get("chunk")?)?;
    let url = non_empty_string(raw.metadata.get("url")?)?;
    let title = raw.metadata.get("title").and_then(non_empty_string);
    Some(ScoredSnippet {
        score,
        meta: SnippetMeta { url, title, chunk },
    })
}

/// Filter, rank, and cap raw matches, then apply the confidence gate.
pub fn gate_matches(matches: Vec<RawMatch>) -> RetrievalOutcome {
    let mut snippets: Vec<ScoredSnippet> = matches.into_iter().filter_map(validate).collect();
    snippets.sort_by(|a, b| b.score.total_cmp(&a.score));
    snippets.truncate(TOP_K as usize);
    let confident = snippets
        .first()
        .map(|best| best.score >= CONFIDENCE_THRESHOLD)
        .unwrap_or(false);
    RetrievalOutcome { snippets, confident }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(score: Option<f64>, metadata: Value) -> RawMatch {
        RawMatch {
            id: None,
            score,
            metadata,
        }
    }

    fn full(score: f64, chunk: &str) -> RawMatch {
        raw(
            Some(score),
            json!({"chunk": chunk, "url": "https://example.com", "title": "Page"}),
        )
    }

    #[test]
    fn test_invalid_matches_are_dropped() {
        let outcome = gate_matches(vec![
            raw(None, json!({"chunk": "a", "url": "u"})),
            raw(Some(f64::NAN), json!({"chunk": "a", "url": "u"})),
            raw(Some(0.9), json!({"url": "u"})),
            raw(Some(0.9), json!({"chunk": "", "url": "u"})),
            raw(Some(0.9), json!({"chunk": "a"})),
            raw(Some(0.9), json!({"chunk": "a", "url": 42})),
        ]);
        assert!(outcome.snippets.is_empty());
        assert!(!outcome.confident);
    }

    #[test]
    fn test_ranked_and_capped_at_top_k() {
        let matches = (0..8).map(|i| full(0.1 * i as f64, "chunk")).collect();
        let outcome = gate_matches(matches);
        assert_eq!(outcome.snippets.len(), TOP_K as usize);
        let scores: Vec<f64> = outcome.snippets.iter().map(|s| s.score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(scores, sorted);
        assert!((outcome.best_score().unwrap() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_threshold_is_inclusive() {
        let outcome = gate_matches(vec![full(0.35, "chunk")]);
        assert!(outcome.confident);

        let outcome = gate_matches(vec![full(0.349999, "chunk")]);
        assert!(!outcome.confident);
    }

    #[test]
    fn test_only_best_score_decides_confidence() {
        let outcome = gate_matches(vec![full(0.6, "a"), full(0.05, "b")]);
        assert!(outcome.confident);
        assert_eq!(outcome.snippets.len(), 2);
    }
}
