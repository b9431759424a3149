use serde::{Deserialize, Serialize};
use time::Date;

use super::privacy::MetricCard;
use super::repo_types::RequestWithProfile;
use crate::profiles::repo_types::Profile;
use crate::stats::repo_types::UserStatsHistory;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Deserialize)]
pub struct SendRequestBody {
    pub invite_code: String,
}

#[derive(Debug, Serialize)]
pub struct RequestsResponse {
    pub incoming: Vec<RequestWithProfile>,
    pub outgoing: Vec<RequestWithProfile>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub fasting: i32,
    pub sleep: i32,
    pub mindfulness: i32,
    pub steps: i32,
}

impl From<&UserStatsHistory> for Streaks {
    fn from(s: &UserStatsHistory) -> Self {
        Self {
            fasting: s.fasting_streak,
            sleep: s.sleep_streak,
            mindfulness: s.mindfulness_streak,
            steps: s.steps_streak,
        }
    }
}

/// One entry of the friend list: today's score and streaks, never raw metrics.
#[derive(Debug, Clone, Serialize)]
pub struct FriendSummary {
    pub profile: Profile,
    pub daily_score: i32,
    pub streaks: Streaks,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendProfileView {
    pub profile: Profile,
    pub daily_score: i32,
    pub message: &'static str,
    pub share_exact_numbers: bool,
    pub metrics: Vec<MetricCard>,
    /// Daily scores for the last week, oldest first.
    pub history: Vec<HistoryPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub daily_score: i32,
}
