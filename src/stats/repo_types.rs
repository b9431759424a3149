use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One row per user per calendar date. Streak columns are owned by whatever
/// job produces them; this service only stores and returns them.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserStatsHistory {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub daily_score: i32,
    pub fasting_hours: f64,
    pub water_ml: i32,
    pub sleep_hours: f64,
    pub mindfulness_minutes: i32,
    pub steps: i32,
    pub fasting_streak: i32,
    pub sleep_streak: i32,
    pub mindfulness_streak: i32,
    pub steps_streak: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The day's metric values written into a stats row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyMetrics {
    pub daily_score: i32,
    pub fasting_hours: f64,
    pub water_ml: i32,
    pub sleep_hours: f64,
    pub mindfulness_minutes: i32,
    pub steps: i32,
}
