//! Per-resource display rows built from normalized records.

use serde::Serialize;

use crate::derive::{
    DifficultyClass, RankMarker, display_name, format_date, keys, rank_label,
};
use crate::record::{NOT_AVAILABLE, Record, resolve_count, resolve_text, resolve_text_or};
use crate::resources::Resource;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityView {
    pub id: String,
    pub user: String,
    pub activity_type: String,
    pub duration: String,
    pub distance: String,
    pub calories: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardView {
    pub position: usize,
    pub rank: RankMarker,
    pub rank_label: String,
    pub rank_class: &'static str,
    pub user: String,
    pub points: String,
    pub team: String,
    pub activities: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamView {
    pub name: String,
    pub members: u64,
    pub description: String,
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub team: String,
    pub joined: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutView {
    pub name: String,
    pub user: Option<String>,
    pub workout_type: String,
    pub difficulty: String,
    pub difficulty_class: DifficultyClass,
    pub difficulty_tag: &'static str,
    pub description: String,
    pub duration: String,
    pub calories: Option<String>,
    pub target: Option<String>,
    pub equipment: Option<String>,
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DerivedView {
    Activity(ActivityView),
    Leaderboard(LeaderboardView),
    Team(TeamView),
    User(UserView),
    Workout(WorkoutView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Plain,
    Rank(RankMarker),
    Difficulty(DifficultyClass),
}

pub fn columns(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Activities => &[
            "ID",
            "User",
            "Activity Type",
            "Duration (min)",
            "Distance (km)",
            "Calories",
            "Date",
        ],
        Resource::Leaderboard => &["Rank", "User", "Points", "Team", "Activities"],
        Resource::Teams => &["Team", "Members", "Description", "Created"],
        Resource::Users => &["ID", "Name", "Username", "Email", "Team", "Joined"],
        Resource::Workouts => &[
            "Workout",
            "Type",
            "Difficulty",
            "Duration (min)",
            "For",
            "Description",
        ],
    }
}

impl ActivityView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: resolve_text_or(record, &["id"], NOT_AVAILABLE),
            user: resolve_text_or(record, keys::USER, NOT_AVAILABLE),
            activity_type: resolve_text_or(record, &["activity_type"], NOT_AVAILABLE),
            duration: resolve_text_or(record, &["duration"], NOT_AVAILABLE),
            distance: resolve_text_or(record, &["distance"], NOT_AVAILABLE),
            calories: resolve_text(record, &["calories"])
                .map(|cal| format!("{cal} cal"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            date: format_date(record, &["date"]),
        }
    }
}

impl LeaderboardView {
    pub fn from_record(position: usize, record: &Record) -> Self {
        Self {
            position,
            rank: RankMarker::for_position(position),
            rank_label: rank_label(position),
            rank_class: RankMarker::for_position(position).class_tag(),
            user: resolve_text_or(record, keys::USER, NOT_AVAILABLE),
            points: resolve_text_or(record, keys::POINTS, "0"),
            team: resolve_text_or(record, keys::TEAM, NOT_AVAILABLE),
            activities: resolve_count(record, keys::ACTIVITY_COUNT).unwrap_or(0),
        }
    }
}

impl TeamView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: resolve_text_or(record, &["name"], NOT_AVAILABLE),
            members: resolve_count(record, keys::MEMBER_COUNT).unwrap_or(0),
            description: resolve_text_or(record, &["description"], "No description provided"),
            created: format_date(record, &["created_at"]),
        }
    }
}

impl UserView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: resolve_text_or(record, &["id"], NOT_AVAILABLE),
            name: display_name(record),
            username: resolve_text_or(record, &["username"], NOT_AVAILABLE),
            email: resolve_text_or(record, &["email"], NOT_AVAILABLE),
            team: resolve_text_or(record, keys::TEAM, "No Team"),
            joined: format_date(record, &["date_joined"]),
        }
    }
}

impl WorkoutView {
    pub fn from_record(record: &Record) -> Self {
        let created = resolve_text(record, keys::WORKOUT_CREATED)
            .map(|_| format_date(record, keys::WORKOUT_CREATED));
        let difficulty_class = DifficultyClass::classify(record);
        Self {
            name: resolve_text_or(record, keys::WORKOUT_NAME, NOT_AVAILABLE),
            user: resolve_text(record, keys::USER),
            workout_type: resolve_text_or(record, keys::WORKOUT_TYPE, NOT_AVAILABLE),
            difficulty: resolve_text_or(record, keys::DIFFICULTY, NOT_AVAILABLE),
            difficulty_class,
            difficulty_tag: difficulty_class.class_tag(),
            description: resolve_text_or(record, &["description"], "No description available"),
            duration: resolve_text_or(record, &["duration"], NOT_AVAILABLE),
            calories: resolve_text(record, &["calories_estimate"]),
            target: resolve_text(record, keys::TARGET_MUSCLES),
            equipment: resolve_text(record, keys::EQUIPMENT),
            created,
        }
    }
}

impl DerivedView {
    pub fn from_record(resource: Resource, position: usize, record: &Record) -> Self {
        match resource {
            Resource::Activities => DerivedView::Activity(ActivityView::from_record(record)),
            Resource::Leaderboard => {
                DerivedView::Leaderboard(LeaderboardView::from_record(position, record))
            }
            Resource::Teams => DerivedView::Team(TeamView::from_record(record)),
            Resource::Users => DerivedView::User(UserView::from_record(record)),
            Resource::Workouts => DerivedView::Workout(WorkoutView::from_record(record)),
        }
    }

    /// Cell texts in the order of [`columns`].
    pub fn cells(&self) -> Vec<String> {
        match self {
            DerivedView::Activity(a) => vec![
                a.id.clone(),
                a.user.clone(),
                a.activity_type.clone(),
                a.duration.clone(),
                a.distance.clone(),
                a.calories.clone(),
                a.date.clone(),
            ],
            DerivedView::Leaderboard(l) => vec![
                l.rank_label.clone(),
                l.user.clone(),
                format!("{} pts", l.points),
                l.team.clone(),
                l.activities.to_string(),
            ],
            DerivedView::Team(t) => vec![
                t.name.clone(),
                format!("{} members", t.members),
                t.description.clone(),
                t.created.clone(),
            ],
            DerivedView::User(u) => vec![
                u.id.clone(),
                u.name.clone(),
                u.username.clone(),
                u.email.clone(),
                u.team.clone(),
                u.joined.clone(),
            ],
            DerivedView::Workout(w) => vec![
                w.name.clone(),
                w.workout_type.clone(),
                w.difficulty.clone(),
                w.duration.clone(),
                w.user.clone().unwrap_or_default(),
                w.description.clone(),
            ],
        }
    }

    pub fn style(&self) -> RowStyle {
        match self {
            DerivedView::Leaderboard(l) => RowStyle::Rank(l.rank),
            DerivedView::Workout(w) => RowStyle::Difficulty(w.difficulty_class),
            _ => RowStyle::Plain,
        }
    }

    /// Extra labelled fields for the detail pane; optional ones are omitted
    /// when absent.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        match self {
            DerivedView::Workout(w) => {
                let mut lines = vec![("Description", w.description.clone())];
                if let Some(cal) = &w.calories {
                    lines.push(("Calories", format!("{cal} cal")));
                }
                if let Some(target) = &w.target {
                    lines.push(("Target", target.clone()));
                }
                if let Some(equipment) = &w.equipment {
                    lines.push(("Equipment", equipment.clone()));
                }
                if let Some(created) = &w.created {
                    lines.push(("Created", created.clone()));
                }
                lines
            }
            DerivedView::Team(t) => vec![
                ("Description", t.description.clone()),
                ("Created", t.created.clone()),
            ],
            _ => Vec::new(),
        }
    }
}

pub fn derive_all(resource: Resource, records: &[Record]) -> Vec<DerivedView> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| DerivedView::from_record(resource, position, record))
        .collect()
}
