//! Resolution of parsed leaderboard queries against the snapshot store.
//!
//! Store and transport errors are swallowed into the generic "not found"
//! reply; raw datastore errors never reach the end user.

use chrono::NaiveDate;
use serde_json::json;
use tracing::warn;

use crate::language::SupportedLanguage;
use crate::leaderboard::format::{format_change_reply, format_rank_reply, format_top_reply};
use crate::leaderboard::{parse_query, QueryKind, Scope, SnapshotStore};
use crate::replies;

/// Outcome of offering a message to the leaderboard resolver.
#[derive(Debug, Clone)]
pub enum ResolverOutcome {
    /// Intent gate failed; the message falls through to retrieval.
    NotHandled,
    Handled {
        text: String,
        reason: &'static str,
        metadata: serde_json::Value,
    },
}

fn handled(text: String, reason: &'static str, metadata: serde_json::Value) -> ResolverOutcome {
    ResolverOutcome::Handled {
        text,
        reason,
        metadata,
    }
}

/// Try to answer `input` (lower-cased) as a leaderboard question.
pub fn resolve(
    input: &str,
    today: NaiveDate,
    language: SupportedLanguage,
    store: &dyn SnapshotStore,
) -> ResolverOutcome {
    let query = parse_query(input, today);
    if !query.intent {
        return ResolverOutcome::NotHandled;
    }

    let date = match query.date {
        Some(date) => date,
        None => {
            return handled(
                replies::leaderboard_missing_date_reply(language),
                "leaderboard_missing_date",
                json!({}),
            );
        }
    };

    let base_metadata = json!({
        "date": date.to_string(),
        "scope": query.scope.as_str(),
        "kind": query.kind,
    });

    match query.kind {
        QueryKind::Rank => {
            let rank = match query.rank {
                Some(rank) => rank,
                None => {
                    return handled(
                        replies::leaderboard_missing_rank_reply(language),
                        "leaderboard_missing_rank",
                        base_metadata,
                    );
                }
            };
            match fetch_snapshot(store, query.scope, date) {
                Some(snapshot) => handled(
                    format_rank_reply(&snapshot, rank, language),
                    "leaderboard",
                    json!({
                        "date": date.to_string(),
                        "scope": query.scope.as_str(),
                        "kind": query.kind,
                        "rank": rank,
                    }),
                ),
                None => not_found(language, base_metadata),
            }
        }
        QueryKind::Top => {
            // kind is Top only when a top-N token parsed
            let top_n = query.top_n.unwrap_or(1);
            match fetch_snapshot(store, query.scope, date) {
                Some(snapshot) => handled(
                    format_top_reply(&snapshot, top_n, language),
                    "leaderboard",
                    json!({
                        "date": date.to_string(),
                        "scope": query.scope.as_str(),
                        "kind": query.kind,
                        "top_n": top_n,
                    }),
                ),
                None => not_found(language, base_metadata),
            }
        }
        QueryKind::Change => {
            // Change semantics only exist for week scope; anything else is a
            // "not found", never a silent coercion to week.
            if query.scope != Scope::Week {
                return not_found(language, base_metadata);
            }
            let current = match fetch_snapshot(store, Scope::Week, date) {
                Some(snapshot) => snapshot,
                None => return not_found(language, base_metadata),
            };
            let previous = match store.previous_week_before(current.period_start) {
                Ok(previous) => previous,
                Err(e) => {
                    warn!("Previous-week snapshot lookup failed: {}", e);
                    None
                }
            };
            handled(
                format_change_reply(&current, previous.as_ref(), language),
                "leaderboard_change",
                base_metadata,
            )
        }
    }
}

fn fetch_snapshot(
    store: &dyn SnapshotStore,
    scope: Scope,
    date: NaiveDate,
) -> Option<crate::leaderboard::LeaderboardSnapshot> {
    match store.snapshot_for(scope, date) {
        Ok(Some(snapshot)) if !snapshot.entries.is_empty() => Some(snapshot),
        Ok(_) => None,
        Err(e) => {
            warn!("Leaderboard snapshot lookup failed: {}", e);
            None
        }
    }
}

fn not_found(language: SupportedLanguage, metadata: serde_json::Value) -> ResolverOutcome {
    handled(
        replies::leaderboard_not_found_reply(language),
        "leaderboard_not_found",
        metadata,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{LeaderboardEntry, LeaderboardSnapshot};

    struct FixtureStore {
        snapshots: Vec<LeaderboardSnapshot>,
        fail: bool,
    }

    impl SnapshotStore for FixtureStore {
        fn snapshot_for(
            &self,
            scope: Scope,
            date: NaiveDate,
        ) -> anyhow::Result<Option<LeaderboardSnapshot>> {
            if self.fail {
                anyhow::bail!("store offline");
            }
            Ok(self
                .snapshots
                .iter()
                .find(|s| s.scope == scope && s.period_start <= date && s.period_end >= date)
                .cloned())
        }

        fn previous_week_before(
            &self,
            before: NaiveDate,
        ) -> anyhow::Result<Option<LeaderboardSnapshot>> {
            if self.fail {
                anyhow::bail!("store offline");
            }
            Ok(self
                .snapshots
                .iter()
                .filter(|s| s.scope == Scope::Week && s.period_end < before)
                .max_by_key(|s| s.period_end)
                .cloned())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(rank: u32, username: &str, minutes: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank,
            username: username.to_string(),
            minutes,
            title: None,
            emojis: None,
        }
    }

    /// The sample payload: one day board, one week board, one month board.
    fn sample_store() -> FixtureStore {
        FixtureStore {
            fail: false,
            snapshots: vec![
                LeaderboardSnapshot {
                    scope: Scope::Day,
                    period_start: date(2024, 5, 1),
                    period_end: date(2024, 5, 1),
                    posted_at: None,
                    entries: vec![entry(1, "alice", 120.0), entry(2, "bob", 95.0)],
                },
                LeaderboardSnapshot {
                    scope: Scope::Week,
                    period_start: date(2024, 4, 29),
                    period_end: date(2024, 5, 5),
                    posted_at: None,
                    entries: vec![
                        entry(1, "charlie", 540.0),
                        entry(2, "alice", 520.0),
                        entry(3, "bob", 480.0),
                    ],
                },
                LeaderboardSnapshot {
                    scope: Scope::Month,
                    period_start: date(2024, 4, 1),
                    period_end: date(2024, 4, 30),
                    posted_at: None,
                    entries: vec![
                        entry(1, "diana", 2100.0),
                        entry(2, "charlie", 1980.0),
                        entry(3, "alice", 1820.0),
                    ],
                },
            ],
        }
    }

    fn resolve_en(input: &str, store: &FixtureStore) -> ResolverOutcome {
        resolve(input, date(2024, 5, 1), SupportedLanguage::En, store)
    }

    fn handled_text(outcome: ResolverOutcome) -> String {
        match outcome {
            ResolverOutcome::Handled { text, .. } => text,
            ResolverOutcome::NotHandled => panic!("expected a handled outcome"),
        }
    }

    // ===== Scenario Tests =====

    #[test]
    fn test_date_plus_rank_scenario() {
        let store = sample_store();
        let text = handled_text(resolve_en("who was rank 2 on 2024-05-01?", &store));
        assert!(text.contains("#2 @bob with 95 minutes."));
    }

    #[test]
    fn test_top_three_this_week_scenario() {
        let store = sample_store();
        let text = handled_text(resolve_en("top 3 this week", &store));
        assert!(text.contains("@charlie"));
        assert!(text.contains("@alice"));
        assert!(text.contains("@bob"));
        let charlie = text.find("@charlie").unwrap();
        let bob = text.find("@bob").unwrap();
        assert!(charlie < bob);
    }

    #[test]
    fn test_bare_hash_one_is_not_handled() {
        let store = sample_store();
        assert!(matches!(
            resolve_en("who is #1?", &store),
            ResolverOutcome::NotHandled
        ));
    }

    #[test]
    fn test_missing_date_prompt() {
        let store = sample_store();
        match resolve_en("show me the leaderboard", &store) {
            ResolverOutcome::Handled { reason, .. } => {
                assert_eq!(reason, "leaderboard_missing_date");
            }
            ResolverOutcome::NotHandled => panic!("keyword should engage the resolver"),
        }
    }

    #[test]
    fn test_missing_rank_prompt() {
        let store = sample_store();
        match resolve_en("whats the leaderboard for 2024-05-01", &store) {
            ResolverOutcome::Handled { reason, .. } => {
                assert_eq!(reason, "leaderboard_missing_rank");
            }
            ResolverOutcome::NotHandled => panic!("keyword should engage the resolver"),
        }
    }

    #[test]
    fn test_no_snapshot_for_date() {
        let store = sample_store();
        match resolve_en("who was rank 1 on 2023-01-01?", &store) {
            ResolverOutcome::Handled { reason, .. } => {
                assert_eq!(reason, "leaderboard_not_found");
            }
            ResolverOutcome::NotHandled => panic!("date+rank should engage the resolver"),
        }
    }

    #[test]
    fn test_store_error_becomes_not_found() {
        let store = FixtureStore {
            snapshots: vec![],
            fail: true,
        };
        match resolve_en("who was rank 2 on 2024-05-01?", &store) {
            ResolverOutcome::Handled { reason, .. } => {
                assert_eq!(reason, "leaderboard_not_found");
            }
            ResolverOutcome::NotHandled => panic!("gate passes even when the store is down"),
        }
    }

    #[test]
    fn test_change_requires_week_scope() {
        let store = sample_store();
        match resolve_en("leaderboard change for today", &store) {
            ResolverOutcome::Handled { reason, .. } => {
                // today implies day scope; change is never coerced to week
                assert_eq!(reason, "leaderboard_not_found");
            }
            ResolverOutcome::NotHandled => panic!("keyword should engage the resolver"),
        }
    }

    #[test]
    fn test_change_against_previous_week() {
        let mut store = sample_store();
        store.snapshots.push(LeaderboardSnapshot {
            scope: Scope::Week,
            period_start: date(2024, 4, 22),
            period_end: date(2024, 4, 28),
            posted_at: None,
            entries: vec![entry(1, "Alice", 600.0), entry(2, "charlie", 550.0)],
        });
        let text = handled_text(resolve_en("leaderboard change this week", &store));
        assert!(text.contains("@charlie — up 1"));
        assert!(text.contains("@alice — down 1"));
        assert!(text.contains("@bob — new"));
    }
}
