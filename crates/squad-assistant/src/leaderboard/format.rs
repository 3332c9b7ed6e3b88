//! Reply formatting for resolved leaderboard questions.

use crate::language::SupportedLanguage;
use crate::leaderboard::{LeaderboardEntry, LeaderboardSnapshot};
use crate::replies::leaderboard_scope_label;

fn format_username(username: &str) -> String {
    if username.is_empty() {
        return "unknown".to_string();
    }
    if username.starts_with('@') {
        username.to_string()
    } else {
        format!("@{}", username)
    }
}

fn format_minutes(minutes: f64) -> String {
    if minutes.is_finite() {
        format!("{}", minutes.round() as i64)
    } else {
        format!("{}", minutes)
    }
}

fn format_period(snapshot: &LeaderboardSnapshot) -> String {
    if snapshot.period_start != snapshot.period_end {
        format!("{} to {}", snapshot.period_start, snapshot.period_end)
    } else {
        snapshot.period_start.to_string()
    }
}

/// Lookup is by exact `rank` field, never by array index.
pub fn format_rank_reply(
    snapshot: &LeaderboardSnapshot,
    rank: u32,
    language: SupportedLanguage,
) -> String {
    let label = leaderboard_scope_label(snapshot.scope, language);
    let period = format_period(snapshot);
    match snapshot.entries.iter().find(|entry| entry.rank == rank) {
        Some(entry) => format!(
            "{} ({}): #{} {} with {} minutes.",
            label,
            period,
            rank,
            format_username(&entry.username),
            format_minutes(entry.minutes),
        ),
        None => format!("{} ({}): no entry recorded for #{}.", label, period, rank),
    }
}

pub fn format_top_reply(
    snapshot: &LeaderboardSnapshot,
    requested: u32,
    language: SupportedLanguage,
) -> String {
    let label = leaderboard_scope_label(snapshot.scope, language);
    let period = format_period(snapshot);

    let mut sorted: Vec<&LeaderboardEntry> = snapshot.entries.iter().collect();
    sorted.sort_by_key(|entry| entry.rank);
    sorted.truncate(requested as usize);

    let mut lines = vec![format!("{} ({}) — top {}:", label, period, sorted.len())];
    for entry in &sorted {
        lines.push(format!(
            "#{} {} with {} minutes.",
            entry.rank,
            format_username(&entry.username),
            format_minutes(entry.minutes),
        ));
    }
    if (sorted.len() as u32) < requested {
        lines.push(format!("(showing {} of {})", sorted.len(), requested));
    }
    lines.join("\n")
}

/// Week-over-week movement. Users are matched across snapshots by
/// case-insensitive, `@`-stripped username; a lower rank number is better,
/// so `previous_rank > current_rank` reads "up".
pub fn format_change_reply(
    current: &LeaderboardSnapshot,
    previous: Option<&LeaderboardSnapshot>,
    language: SupportedLanguage,
) -> String {
    let label = leaderboard_scope_label(current.scope, language);
    let period = format_period(current);

    let mut sorted: Vec<&LeaderboardEntry> = current.entries.iter().collect();
    sorted.sort_by_key(|entry| entry.rank);

    let mut lines = vec![format!("{} ({}) vs previous week:", label, period)];
    for entry in &sorted {
        let movement = match previous.and_then(|prev| find_previous_rank(prev, &entry.username)) {
            Some(previous_rank) if previous_rank > entry.rank => {
                format!("up {}", previous_rank - entry.rank)
            }
            Some(previous_rank) if previous_rank < entry.rank => {
                format!("down {}", entry.rank - previous_rank)
            }
            Some(_) => "no change".to_string(),
            None => "new".to_string(),
        };
        lines.push(format!(
            "#{} {} — {}",
            entry.rank,
            format_username(&entry.username),
            movement,
        ));
    }
    lines.join("\n")
}

fn normalize_username(username: &str) -> String {
    username.trim_start_matches('@').to_lowercase()
}

fn find_previous_rank(previous: &LeaderboardSnapshot, username: &str) -> Option<u32> {
    let needle = normalize_username(username);
    previous
        .entries
        .iter()
        .find(|entry| normalize_username(&entry.username) == needle)
        .map(|entry| entry.rank)
}
