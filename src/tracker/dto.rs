use serde::Serialize;

use super::model::TrackerSnapshot;
use crate::score::{MetricCompletion, MetricProgress};

#[derive(Debug, Serialize)]
pub struct TrackerView {
    pub snapshot: TrackerSnapshot,
    #[serde(flatten)]
    pub score: ScoreView,
}

#[derive(Debug, Serialize)]
pub struct ScoreView {
    pub daily_score: u8,
    pub message: &'static str,
    pub progress: MetricProgress,
    pub completion: MetricCompletion,
}
