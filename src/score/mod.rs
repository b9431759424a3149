//! Daily score: a weighted aggregate of the five tracked metrics.

use serde::Serialize;
use time::OffsetDateTime;

use crate::tracker::model::TrackerSnapshot;

pub const FASTING_WEIGHT: f64 = 0.30;
pub const SLEEP_WEIGHT: f64 = 0.25;
pub const WATER_WEIGHT: f64 = 0.20;
pub const MINDFULNESS_WEIGHT: f64 = 0.15;
pub const STEPS_WEIGHT: f64 = 0.10;

/// Per-metric progress, every field in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricProgress {
    pub fasting: f64,
    pub sleep: f64,
    pub water: f64,
    pub mindfulness: f64,
    pub steps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricCompletion {
    pub fasting: bool,
    pub sleep: bool,
    pub water: bool,
    pub mindfulness: bool,
    pub steps: bool,
}

/// Clamps to `[0, 1]`; non-finite input (zero goal, NaN entry) yields 0.
pub fn ratio(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// `value / max(1, target)`, clamped.
pub fn ratio_of(value: f64, target: f64) -> f64 {
    ratio(value / target.max(1.0))
}

pub fn compute_progress(snapshot: &TrackerSnapshot, now: OffsetDateTime) -> MetricProgress {
    let fasting = &snapshot.fasting;
    let mindfulness = &snapshot.mindfulness;
    MetricProgress {
        // goal_hours is not floored at 1: a zero goal is non-finite and degrades to 0
        fasting: ratio(fasting.effective_hours(now) / fasting.goal_hours),
        sleep: ratio_of(snapshot.sleep.hours_slept, snapshot.sleep.target),
        water: ratio_of(snapshot.water.current, snapshot.water.target),
        mindfulness: if mindfulness.is_complete {
            1.0
        } else {
            ratio_of(mindfulness.minutes, mindfulness.target)
        },
        steps: ratio_of(snapshot.steps.current, snapshot.steps.target),
    }
}

impl MetricProgress {
    pub fn weighted(&self) -> f64 {
        self.fasting * FASTING_WEIGHT
            + self.sleep * SLEEP_WEIGHT
            + self.water * WATER_WEIGHT
            + self.mindfulness * MINDFULNESS_WEIGHT
            + self.steps * STEPS_WEIGHT
    }

    /// Weighted sum scaled to 0..=100, rounded half up.
    pub fn score(&self) -> u8 {
        let scaled = (self.weighted() * 100.0 + 0.5).floor();
        scaled.clamp(0.0, 100.0) as u8
    }

    pub fn completion(&self) -> MetricCompletion {
        MetricCompletion {
            fasting: self.fasting >= 1.0,
            sleep: self.sleep >= 1.0,
            water: self.water >= 1.0,
            mindfulness: self.mindfulness >= 1.0,
            steps: self.steps >= 1.0,
        }
    }
}

pub fn compute_daily_score(snapshot: &TrackerSnapshot, now: OffsetDateTime) -> u8 {
    compute_progress(snapshot, now).score()
}

pub fn compute_completion(snapshot: &TrackerSnapshot, now: OffsetDateTime) -> MetricCompletion {
    compute_progress(snapshot, now).completion()
}

pub fn score_message(score: i32) -> &'static str {
    match score {
        s if s >= 90 => "Outstanding work!",
        s if s >= 75 => "Great progress!",
        s if s >= 50 => "Keep going!",
        s if s > 0 => "You've got this!",
        _ => "Start your journey!",
    }
}
