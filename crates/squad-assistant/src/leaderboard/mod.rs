//! Leaderboard natural-language questions: a small grammar over free text
//! (dates, scopes, ranks, top-N, week-over-week changes) answered directly
//! from posted snapshots, bypassing retrieval entirely.
pub mod format;
pub mod parser;
pub mod resolver;

pub use parser::{parse_query, DateSource, LeaderboardQuery, QueryKind};
pub use resolver::{resolve, ResolverOutcome};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Leaderboard aggregation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Day,
    Week,
    Month,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Day => "day",
            Scope::Week => "week",
            Scope::Month => "month",
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "day" => Ok(Scope::Day),
            "week" => Ok(Scope::Week),
            "month" => Ok(Scope::Month),
            other => Err(anyhow::anyhow!("Unknown leaderboard scope: {}", other)),
        }
    }
}

/// One pre-ranked row of a posted snapshot. Rank values are not assumed
/// contiguous or zero-based anywhere in the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emojis: Option<Vec<String>>,
}

/// One posted leaderboard result for a (scope, period) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub scope: Scope,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub posted_at: Option<DateTime<Utc>>,
    pub entries: Vec<LeaderboardEntry>,
}

/// Read side of the snapshot store collaborator.
pub trait SnapshotStore: Send + Sync {
    /// Most recently posted snapshot of `scope` whose
    /// `[period_start, period_end]` window contains `date`
    /// (tie-break: `posted_at` desc, then `period_end` desc).
    fn snapshot_for(&self, scope: Scope, date: NaiveDate)
        -> anyhow::Result<Option<LeaderboardSnapshot>>;

    /// Nearest earlier week snapshot: `period_end < before`, highest
    /// `period_end` wins.
    fn previous_week_before(&self, before: NaiveDate)
        -> anyhow::Result<Option<LeaderboardSnapshot>>;
}
