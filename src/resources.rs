use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Activities,
    Leaderboard,
    Teams,
    Users,
    Workouts,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Activities,
        Resource::Leaderboard,
        Resource::Teams,
        Resource::Users,
        Resource::Workouts,
    ];

    /// Path relative to the API base, with the trailing slash the backend router expects.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Activities => "activities/",
            Resource::Leaderboard => "leaderboard/",
            Resource::Teams => "teams/",
            Resource::Users => "users/",
            Resource::Workouts => "workouts/",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Resource::Activities => "Activities",
            Resource::Leaderboard => "Leaderboard",
            Resource::Teams => "Teams",
            Resource::Users => "Users",
            Resource::Workouts => "Workouts",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Resource::Activities => "Track all fitness activities",
            Resource::Leaderboard => "Top performers ranked by points",
            Resource::Teams => "Compete together, win together",
            Resource::Users => "Everyone on OctoFit",
            Resource::Workouts => "Personalized workout suggestions",
        }
    }

    /// Noun used on the count badge, e.g. "12 Teams".
    pub fn count_label(self) -> &'static str {
        match self {
            Resource::Activities => "Total",
            Resource::Leaderboard => "Ranked",
            Resource::Teams => "Teams",
            Resource::Users => "Users",
            Resource::Workouts => "Workouts",
        }
    }

    /// Shown instead of an empty table when a load succeeds with no records.
    pub fn empty_notice(self) -> &'static str {
        match self {
            Resource::Activities => "No activities found. Start tracking your fitness journey!",
            Resource::Leaderboard => "No leaderboard data available yet.",
            Resource::Teams => "No teams found. Create your first team!",
            Resource::Users => "No users found.",
            Resource::Workouts => "No workout suggestions available. Check back soon!",
        }
    }

    pub fn index(self) -> usize {
        Resource::ALL
            .iter()
            .position(|r| *r == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Resource {
        Resource::ALL[(self.index() + 1) % Resource::ALL.len()]
    }

    pub fn prev(self) -> Resource {
        let len = Resource::ALL.len();
        Resource::ALL[(self.index() + len - 1) % len]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activities" | "activity" => Ok(Resource::Activities),
            "leaderboard" => Ok(Resource::Leaderboard),
            "teams" | "team" => Ok(Resource::Teams),
            "users" | "user" => Ok(Resource::Users),
            "workouts" | "workout" => Ok(Resource::Workouts),
            other => Err(format!("unknown resource '{other}'")),
        }
    }
}
