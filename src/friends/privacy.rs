//! Presentation of a friend's daily metrics.
//!
//! Friends who opted out of sharing exact numbers are shown as a percentage of
//! a fixed canonical goal. These goals do not follow the viewer's own targets.

use serde::Serialize;

use crate::score::ratio;
use crate::stats::repo_types::UserStatsHistory;

pub const FASTING_GOAL_HOURS: f64 = 16.0;
pub const SLEEP_GOAL_HOURS: f64 = 8.0;
pub const WATER_GOAL_ML: f64 = 2500.0;
pub const MINDFULNESS_GOAL_MINUTES: f64 = 20.0;
pub const STEPS_GOAL: f64 = 10000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Fasting,
    Sleep,
    Water,
    Mindfulness,
    Steps,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Fasting,
        Metric::Sleep,
        Metric::Water,
        Metric::Mindfulness,
        Metric::Steps,
    ];

    pub fn goal(self) -> f64 {
        match self {
            Metric::Fasting => FASTING_GOAL_HOURS,
            Metric::Sleep => SLEEP_GOAL_HOURS,
            Metric::Water => WATER_GOAL_ML,
            Metric::Mindfulness => MINDFULNESS_GOAL_MINUTES,
            Metric::Steps => STEPS_GOAL,
        }
    }

    fn exact(self, value: f64) -> String {
        match self {
            Metric::Fasting | Metric::Sleep => format!("{}h", value),
            Metric::Water => format!("{}ml", value),
            Metric::Mindfulness => format!("{}min", value),
            Metric::Steps => format!("{}", value),
        }
    }

    fn exact_target(self) -> &'static str {
        match self {
            Metric::Fasting => "16h",
            Metric::Sleep => "8h",
            Metric::Water => "2500ml",
            Metric::Mindfulness => "20min",
            Metric::Steps => "10k",
        }
    }

    fn value_of(self, stats: &UserStatsHistory) -> f64 {
        match self {
            Metric::Fasting => stats.fasting_hours,
            Metric::Sleep => stats.sleep_hours,
            Metric::Water => f64::from(stats.water_ml),
            Metric::Mindfulness => f64::from(stats.mindfulness_minutes),
            Metric::Steps => f64::from(stats.steps),
        }
    }

    fn streak_of(self, stats: &UserStatsHistory) -> i32 {
        match self {
            Metric::Fasting => stats.fasting_streak,
            Metric::Sleep => stats.sleep_streak,
            Metric::Mindfulness => stats.mindfulness_streak,
            Metric::Steps => stats.steps_streak,
            Metric::Water => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub value: String,
    pub target: String,
    /// Share of the canonical goal, in `[0, 1]`.
    pub progress: f64,
    pub streak: i32,
}

/// Rounded percentage of the canonical goal. Not capped at 100.
pub fn percent_of_goal(metric: Metric, value: f64) -> i64 {
    let pct = value / metric.goal() * 100.0;
    if pct.is_finite() {
        pct.round() as i64
    } else {
        0
    }
}

pub fn metric_card(metric: Metric, stats: Option<&UserStatsHistory>, share_exact: bool) -> MetricCard {
    let value = stats.map(|s| metric.value_of(s)).unwrap_or(0.0);
    let streak = stats.map(|s| metric.streak_of(s)).unwrap_or(0);
    let (value_label, target_label) = if share_exact {
        (metric.exact(value), metric.exact_target().to_string())
    } else {
        (format!("{}%", percent_of_goal(metric, value)), "100%".to_string())
    };
    MetricCard {
        metric,
        value: value_label,
        target: target_label,
        progress: ratio(value / metric.goal()),
        streak,
    }
}

pub fn metric_cards(stats: Option<&UserStatsHistory>, share_exact: bool) -> Vec<MetricCard> {
    Metric::ALL
        .iter()
        .map(|&m| metric_card(m, stats, share_exact))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    fn stats() -> UserStatsHistory {
        UserStatsHistory {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: date!(2024-05-10),
            daily_score: 64,
            fasting_hours: 12.0,
            water_ml: 2000,
            sleep_hours: 7.5,
            mindfulness_minutes: 25,
            steps: 4321,
            fasting_streak: 3,
            sleep_streak: 1,
            mindfulness_streak: 9,
            steps_streak: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn exact_mode_shows_raw_values() {
        let s = stats();
        let cards = metric_cards(Some(&s), true);
        let labels: Vec<(&str, &str)> = cards
            .iter()
            .map(|c| (c.value.as_str(), c.target.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("12h", "16h"),
                ("7.5h", "8h"),
                ("2000ml", "2500ml"),
                ("25min", "20min"),
                ("4321", "10k"),
            ]
        );
        assert_eq!(cards[0].streak, 3);
        assert_eq!(cards[2].streak, 0);
    }

    #[test]
    fn private_mode_shows_percentages_only() {
        let s = stats();
        let cards = metric_cards(Some(&s), false);
        let values: Vec<&str> = cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["75%", "94%", "80%", "125%", "43%"]);
        assert!(cards.iter().all(|c| c.target == "100%"));
    }

    #[test]
    fn progress_uses_clamped_ratio() {
        let s = stats();
        let cards = metric_cards(Some(&s), false);
        assert_eq!(cards[0].progress, 0.75);
        assert_eq!(cards[3].progress, 1.0);
    }

    #[test]
    fn missing_stats_fall_back_to_zero() {
        let cards = metric_cards(None, true);
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0].value, "0h");
        assert_eq!(cards[4].value, "0");
        assert!(cards.iter().all(|c| c.progress == 0.0 && c.streak == 0));

        let hidden = metric_cards(None, false);
        assert!(hidden.iter().all(|c| c.value == "0%"));
    }
}
