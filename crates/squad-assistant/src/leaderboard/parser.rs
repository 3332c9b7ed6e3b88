//! Free-text parsing front end shared by all leaderboard query kinds.

use chrono::{Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::leaderboard::Scope;

/// Which resolver runs for the parsed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Rank,
    Top,
    Change,
}

/// Where the resolved date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Explicit,
    Today,
    Yesterday,
    ThisWeek,
}

/// Transient parse result; built, resolved, then discarded.
#[derive(Debug, Clone)]
pub struct LeaderboardQuery {
    pub intent: bool,
    pub kind: QueryKind,
    pub date: Option<NaiveDate>,
    pub date_source: Option<DateSource>,
    pub scope: Scope,
    pub rank: Option<u32>,
    pub top_n: Option<u32>,
}

lazy_static! {
    static ref DATE_PATTERN: Regex = Regex::new(r"\b(\d{4})[-/.](\d{2})[-/.](\d{2})\b").unwrap();
    static ref THIS_WEEK: Regex =
        Regex::new(r"(?i)\b(this\s+week|shu\s+hafta)\b|на\s+этой\s+неделе").unwrap();
    static ref TODAY: Regex = Regex::new(r"(?i)\b(today|bugun|сегодня)\b").unwrap();
    static ref YESTERDAY: Regex = Regex::new(r"(?i)\b(yesterday|kecha|вчера)\b").unwrap();
    static ref LEADERBOARD_KEYWORD: Regex = Regex::new(
        r"(?i)\b(leaderboards?|rankings?|лидерборд\w*|рейтинг\w*|reyting\w*|peshqadamlar)\b"
    )
    .unwrap();
    static ref PLACE_KEYWORD: Regex = Regex::new(r"(?i)\bplace\b|\bместо\b|\bo['’`]?rin\b").unwrap();
    static ref ORDINAL_NUMBER: Regex = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap();
    static ref RANK_EXPLICIT: Regex =
        Regex::new(r"(?i)\b(?:rank|place|position)\s*#?\s*(\d{1,3})\b").unwrap();
    static ref RANK_HASH: Regex = Regex::new(r"#(\d{1,3})\b").unwrap();
    static ref RANK_WORD: Regex = Regex::new(
        r"(?i)\b(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth)\b"
    )
    .unwrap();
    static ref TOP_N: Regex = Regex::new(r"(?i)\btop\s+(\d{1,2})\b").unwrap();
    static ref CHANGE_PHRASE: Regex = Regex::new(
        r"(?i)\b(change|changes|delta|week\s+over\s+week)\b|compared?\s+(?:to|with)\s+last\s+week|vs\.?\s+last\s+week|since\s+last\s+week"
    )
    .unwrap();
    static ref SCOPE_EXPLICIT: Regex = Regex::new(r"(?i)\b(daily|weekly|monthly)\b").unwrap();
    static ref SCOPE_LOOSE: Regex = Regex::new(r"(?i)\b(week|month)\b").unwrap();
}

fn rank_word_value(word: &str) -> Option<u32> {
    match word.to_lowercase().as_str() {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "fifth" => Some(5),
        "sixth" => Some(6),
        "seventh" => Some(7),
        "eighth" => Some(8),
        "ninth" => Some(9),
        "tenth" => Some(10),
        _ => None,
    }
}

fn clamp_rank(value: i64) -> Option<u32> {
    if value <= 0 {
        return None;
    }
    Some(value.min(100) as u32)
}

fn parse_date(input: &str, today: NaiveDate) -> (Option<NaiveDate>, Option<DateSource>) {
    // First hit wins: explicit token, "this week", "today", "yesterday".
    if let Some(caps) = DATE_PATTERN.captures(input) {
        let (y, m, d) = (
            caps[1].parse::<i32>().unwrap_or(0),
            caps[2].parse::<u32>().unwrap_or(0),
            caps[3].parse::<u32>().unwrap_or(0),
        );
        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return (Some(date), Some(DateSource::Explicit));
        }
    }
    if THIS_WEEK.is_match(input) {
        return (Some(today), Some(DateSource::ThisWeek));
    }
    if TODAY.is_match(input) {
        return (Some(today), Some(DateSource::Today));
    }
    if YESTERDAY.is_match(input) {
        return (Some(today - Duration::days(1)), Some(DateSource::Yesterday));
    }
    (None, None)
}

fn parse_scope(input: &str, date_source: Option<DateSource>) -> Scope {
    if let Some(caps) = SCOPE_EXPLICIT.captures(input) {
        return match caps[1].to_lowercase().as_str() {
            "weekly" => Scope::Week,
            "monthly" => Scope::Month,
            _ => Scope::Day,
        };
    }
    match date_source {
        Some(DateSource::ThisWeek) => return Scope::Week,
        Some(DateSource::Today) | Some(DateSource::Yesterday) => return Scope::Day,
        _ => {}
    }
    if let Some(caps) = SCOPE_LOOSE.captures(input) {
        return match caps[1].to_lowercase().as_str() {
            "month" => Scope::Month,
            _ => Scope::Week,
        };
    }
    Scope::Day
}

fn parse_rank(input: &str) -> Option<u32> {
    if let Some(caps) = ORDINAL_NUMBER.captures(input) {
        return clamp_rank(caps[1].parse::<i64>().unwrap_or(0));
    }
    if let Some(caps) = RANK_EXPLICIT.captures(input) {
        return clamp_rank(caps[1].parse::<i64>().unwrap_or(0));
    }
    if let Some(caps) = RANK_HASH.captures(input) {
        return clamp_rank(caps[1].parse::<i64>().unwrap_or(0));
    }
    if let Some(caps) = RANK_WORD.captures(input) {
        return rank_word_value(&caps[1]).and_then(|v| clamp_rank(v as i64));
    }
    None
}

fn parse_top_n(input: &str) -> Option<u32> {
    TOP_N
        .captures(input)
        .and_then(|caps| clamp_rank(caps[1].parse::<i64>().unwrap_or(0)))
}

/// Parse one lower-cased message into a `LeaderboardQuery`.
///
/// The intent gate is deliberately asymmetric: a bare "top 5" or "who's #1"
/// without explicit temporal grounding falls through to retrieval unless the
/// sentence carries a leaderboard/ranking keyword.
pub fn parse_query(input: &str, today: NaiveDate) -> LeaderboardQuery {
    let (date, date_source) = parse_date(input, today);
    let scope = parse_scope(input, date_source);
    let rank = parse_rank(input);
    let top_n = parse_top_n(input);

    let kind = if CHANGE_PHRASE.is_match(input) {
        QueryKind::Change
    } else if top_n.is_some() {
        QueryKind::Top
    } else {
        QueryKind::Rank
    };

    let has_date = date.is_some();
    let intent = LEADERBOARD_KEYWORD.is_match(input)
        || (kind == QueryKind::Change && (has_date || THIS_WEEK.is_match(input)))
        || (kind == QueryKind::Top && top_n.is_some() && has_date)
        || (kind == QueryKind::Rank && rank.is_some() && has_date)
        || (PLACE_KEYWORD.is_match(input) && ORDINAL_NUMBER.is_match(input) && has_date);

    LeaderboardQuery {
        intent,
        kind,
        date,
        date_source,
        scope,
        rank,
        top_n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    // ===== Date Extraction Tests =====

    #[test]
    fn test_explicit_date_with_separators() {
        for input in ["on 2024-05-01", "on 2024/05/01", "on 2024.05.01"] {
            let q = parse_query(input, today());
            assert_eq!(q.date, NaiveDate::from_ymd_opt(2024, 5, 1));
            assert_eq!(q.date_source, Some(DateSource::Explicit));
        }
    }

    #[test]
    fn test_invalid_calendar_date_is_dropped() {
        let q = parse_query("leaderboard on 2024-13-45", today());
        assert!(q.date.is_none());
        assert!(q.date_source.is_none());
    }

    #[test]
    fn test_this_week_resolves_to_today() {
        let q = parse_query("top 3 this week", today());
        assert_eq!(q.date, Some(today()));
        assert_eq!(q.date_source, Some(DateSource::ThisWeek));
    }

    #[test]
    fn test_yesterday() {
        let q = parse_query("leaderboard yesterday", today());
        assert_eq!(q.date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(q.date_source, Some(DateSource::Yesterday));
    }

    #[test]
    fn test_explicit_date_wins_over_relative_phrase() {
        let q = parse_query("yesterday or 2024-05-01?", today());
        assert_eq!(q.date_source, Some(DateSource::Explicit));
    }

    // ===== Scope Resolution Tests =====

    #[test]
    fn test_explicit_scope_keyword_beats_date_source() {
        let q = parse_query("weekly leaderboard yesterday", today());
        assert_eq!(q.scope, Scope::Week);
    }

    #[test]
    fn test_this_week_implies_week_scope() {
        let q = parse_query("top 3 this week", today());
        assert_eq!(q.scope, Scope::Week);
    }

    #[test]
    fn test_today_implies_day_scope() {
        let q = parse_query("leaderboard today", today());
        assert_eq!(q.scope, Scope::Day);
    }

    #[test]
    fn test_loose_week_keyword() {
        let q = parse_query("leaderboard for the week of 2024-05-01", today());
        assert_eq!(q.scope, Scope::Week);
    }

    #[test]
    fn test_bare_week_yields_to_date_source() {
        // Only the -ly forms count as explicit scope; a bare "week" sits
        // below the relative-date tier, so "yesterday" pins the day scope.
        let q = parse_query("week leaderboard yesterday", today());
        assert_eq!(q.scope, Scope::Day);
    }

    #[test]
    fn test_default_scope_is_day() {
        let q = parse_query("who was rank 2 on 2024-05-01?", today());
        assert_eq!(q.scope, Scope::Day);
    }

    // ===== Rank / Top-N Extraction Tests =====

    #[test]
    fn test_ordinal_rank() {
        let q = parse_query("who took 3rd on 2024-05-01", today());
        assert_eq!(q.rank, Some(3));
    }

    #[test]
    fn test_explicit_rank_number() {
        let q = parse_query("who was rank 2 on 2024-05-01?", today());
        assert_eq!(q.rank, Some(2));
    }

    #[test]
    fn test_hash_rank() {
        let q = parse_query("who is #1 on the leaderboard today", today());
        assert_eq!(q.rank, Some(1));
    }

    #[test]
    fn test_rank_word() {
        let q = parse_query("who came first on 2024-05-01", today());
        assert_eq!(q.rank, Some(1));
    }

    #[test]
    fn test_rank_clamped_to_hundred() {
        let q = parse_query("rank 250 on 2024-05-01", today());
        assert_eq!(q.rank, Some(100));
    }

    #[test]
    fn test_rank_zero_discarded() {
        let q = parse_query("leaderboard rank 0 today", today());
        assert_eq!(q.rank, None);
    }

    #[test]
    fn test_top_n() {
        let q = parse_query("top 3 this week", today());
        assert_eq!(q.top_n, Some(3));
        assert_eq!(q.kind, QueryKind::Top);
    }

    // ===== Kind Selection Tests =====

    #[test]
    fn test_change_phrase_selects_change_kind() {
        let q = parse_query("leaderboard change vs last week this week", today());
        assert_eq!(q.kind, QueryKind::Change);
    }

    #[test]
    fn test_default_kind_is_rank() {
        let q = parse_query("leaderboard today", today());
        assert_eq!(q.kind, QueryKind::Rank);
    }

    // ===== Intent Gate Tests =====

    #[test]
    fn test_keyword_alone_engages() {
        assert!(parse_query("show me the leaderboard", today()).intent);
        assert!(parse_query("рейтинг за сегодня", today()).intent);
    }

    #[test]
    fn test_rank_with_date_engages_without_keyword() {
        assert!(parse_query("who was rank 2 on 2024-05-01?", today()).intent);
    }

    #[test]
    fn test_bare_number_one_falls_through() {
        // No date, no leaderboard keyword: not a leaderboard query.
        assert!(!parse_query("who is #1?", today()).intent);
    }

    #[test]
    fn test_bare_top_five_falls_through() {
        // Deliberate asymmetry: "top 5" alone is rejected without a date or
        // a leaderboard keyword.
        assert!(!parse_query("top 5", today()).intent);
        assert!(parse_query("top 5 leaderboard", today()).intent);
        assert!(parse_query("top 5 today", today()).intent);
    }

    #[test]
    fn test_bare_rank_without_date_falls_through() {
        // "rank" is not an intent keyword on its own; undated rank
        // questions go to retrieval instead of a date prompt.
        assert!(!parse_query("what's rank 5", today()).intent);
        assert!(parse_query("what's rank 5 on the leaderboard", today()).intent);
    }

    #[test]
    fn test_change_with_this_week_engages() {
        assert!(parse_query("any change this week", today()).intent);
    }

    #[test]
    fn test_place_with_ordinal_and_date_engages() {
        assert!(parse_query("whose place was 2nd on 2024-05-01", today()).intent);
    }

    #[test]
    fn test_dated_message_without_rank_falls_through() {
        assert!(!parse_query("what happened on 2024-05-01?", today()).intent);
    }
}
