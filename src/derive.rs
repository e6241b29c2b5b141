//! Display-only values computed from normalized records.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::record::{NOT_AVAILABLE, Record, resolve, resolve_text, value_text};

pub mod keys {
    pub const USER: &[&str] = &["user_name", "user"];
    pub const TEAM: &[&str] = &["team_name", "team"];
    pub const POINTS: &[&str] = &["total_points", "points"];
    pub const ACTIVITY_COUNT: &[&str] = &["activity_count", "activities"];
    pub const MEMBER_COUNT: &[&str] = &["member_count", "members"];
    pub const WORKOUT_NAME: &[&str] = &["name", "title"];
    pub const WORKOUT_TYPE: &[&str] = &["workout_type", "type"];
    pub const TARGET_MUSCLES: &[&str] = &["target_muscle_group", "target_muscles"];
    pub const EQUIPMENT: &[&str] = &["equipment_needed", "equipment"];
    pub const WORKOUT_CREATED: &[&str] = &["created_at", "date"];
    pub const DIFFICULTY: &[&str] = &["difficulty"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMarker {
    First,
    Second,
    Third,
    Neutral,
}

impl RankMarker {
    /// Ranking is by list position only; score fields are never consulted.
    pub fn for_position(position: usize) -> Self {
        match position {
            0 => RankMarker::First,
            1 => RankMarker::Second,
            2 => RankMarker::Third,
            _ => RankMarker::Neutral,
        }
    }

    pub fn medal(self) -> &'static str {
        match self {
            RankMarker::First => "🥇",
            RankMarker::Second => "🥈",
            RankMarker::Third => "🥉",
            RankMarker::Neutral => "",
        }
    }

    pub fn class_tag(self) -> &'static str {
        match self {
            RankMarker::First => "rank-gold",
            RankMarker::Second => "rank-silver",
            RankMarker::Third => "rank-bronze",
            RankMarker::Neutral => "rank-default",
        }
    }
}

pub fn rank_label(position: usize) -> String {
    let marker = RankMarker::for_position(position);
    if marker.medal().is_empty() {
        format!("#{}", position + 1)
    } else {
        format!("{} #{}", marker.medal(), position + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyClass {
    Easy,
    Medium,
    Hard,
    Neutral,
}

impl DifficultyClass {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" => DifficultyClass::Easy,
            "medium" => DifficultyClass::Medium,
            "hard" => DifficultyClass::Hard,
            _ => DifficultyClass::Neutral,
        }
    }

    pub fn classify(record: &Record) -> Self {
        resolve(record, keys::DIFFICULTY)
            .and_then(|v| v.as_str())
            .map(DifficultyClass::from_label)
            .unwrap_or(DifficultyClass::Neutral)
    }

    pub fn class_tag(self) -> &'static str {
        match self {
            DifficultyClass::Easy => "difficulty-easy",
            DifficultyClass::Medium => "difficulty-medium",
            DifficultyClass::Hard => "difficulty-hard",
            DifficultyClass::Neutral => "difficulty-default",
        }
    }
}

/// `first last` when both parts exist, else `name`, else whichever part
/// exists, else "N/A".
pub fn display_name(record: &Record) -> String {
    let first = resolve_text(record, &["first_name"]);
    let last = resolve_text(record, &["last_name"]);
    if let (Some(first), Some(last)) = (&first, &last) {
        return format!("{first} {last}");
    }
    resolve_text(record, &["name"])
        .or(first)
        .or(last)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Formats the first present date field as `M/D/YYYY`. Absent fields give
/// "N/A"; text that does not parse is shown trimmed as received.
pub fn format_date(record: &Record, keys: &[&str]) -> String {
    let Some(value) = resolve(record, keys) else {
        return NOT_AVAILABLE.to_string();
    };
    let raw = value_text(value);
    match parse_date(&raw) {
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
        None => raw.trim().to_string(),
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    let cleaned = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d").ok()
}
