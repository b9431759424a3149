use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const MIN_WATER_TARGET: f64 = 500.0;
pub const MIN_STEPS_TARGET: f64 = 1000.0;
pub const MIN_FASTING_GOAL_HOURS: f64 = 1.0;
pub const MIN_MINDFULNESS_TARGET: f64 = 5.0;
pub const SLEEP_TARGET_RANGE: (f64, f64) = (5.0, 12.0);

/// Undo depth kept per counter; older increments can no longer be undone.
pub const MAX_UNDO_HISTORY: usize = 50;

const SECONDS_PER_HOUR: f64 = 3600.0;

// serde_json writes non-finite floats as `null`, which would not load back
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Fasting window. `start_time` is set exactly while `is_active` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fasting {
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub start_time: Option<OffsetDateTime>,
    pub goal_hours: f64,
    pub is_active: bool,
    pub completed_hours: f64,
}

/// Counter with an undo stack, shared by water (ml) and steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub current: f64,
    pub target: f64,
    #[serde(default)]
    pub history: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sleep {
    pub hours_slept: f64,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mindfulness {
    pub minutes: f64,
    pub target: f64,
    pub is_complete: bool,
}

/// Everything a user tracks for the current day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub fasting: Fasting,
    pub water: Counter,
    pub sleep: Sleep,
    pub mindfulness: Mindfulness,
    pub steps: Counter,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            fasting: Fasting {
                start_time: None,
                goal_hours: 16.0,
                is_active: false,
                completed_hours: 0.0,
            },
            water: Counter {
                current: 0.0,
                target: 2500.0,
                history: Vec::new(),
            },
            sleep: Sleep {
                hours_slept: 0.0,
                target: 8.0,
            },
            mindfulness: Mindfulness {
                minutes: 0.0,
                target: 20.0,
                is_complete: false,
            },
            steps: Counter {
                current: 0.0,
                target: 10000.0,
                history: Vec::new(),
            },
        }
    }
}

impl Fasting {
    /// Hours fasted so far, including the running window of an active fast.
    pub fn effective_hours(&self, now: OffsetDateTime) -> f64 {
        match (self.is_active, self.start_time) {
            (true, Some(start)) => {
                self.completed_hours + (now - start).as_seconds_f64() / SECONDS_PER_HOUR
            }
            _ => self.completed_hours,
        }
    }

    /// Starts a fresh fast, or stops the running one and records its length.
    pub fn toggle(&mut self, now: OffsetDateTime) {
        if self.is_active {
            if let Some(start) = self.start_time {
                self.completed_hours = (now - start).as_seconds_f64() / SECONDS_PER_HOUR;
            }
            self.is_active = false;
            self.start_time = None;
        } else {
            self.is_active = true;
            self.start_time = Some(now);
            self.completed_hours = 0.0;
        }
    }

    pub fn adjust_goal(&mut self, minutes: f64) {
        self.goal_hours = (self.goal_hours + minutes / 60.0).max(MIN_FASTING_GOAL_HOURS);
    }

    fn sanitize(&mut self) {
        self.goal_hours = finite_or_zero(self.goal_hours);
        self.completed_hours = finite_or_zero(self.completed_hours);
    }
}

impl Counter {
    pub fn add(&mut self, amount: f64) {
        self.current += amount;
        self.history.push(amount);
        self.trim_history();
    }

    fn trim_history(&mut self) {
        let excess = self.history.len().saturating_sub(MAX_UNDO_HISTORY);
        self.history.drain(..excess);
    }

    fn sanitize(&mut self) {
        self.current = finite_or_zero(self.current);
        self.target = finite_or_zero(self.target);
        for entry in &mut self.history {
            *entry = finite_or_zero(*entry);
        }
        self.trim_history();
    }

    /// Pops the last increment. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(last) => {
                self.current = (self.current - last).max(0.0);
                true
            }
            None => false,
        }
    }

    pub fn adjust_target(&mut self, delta: f64, floor: f64) {
        self.target = (self.target + delta).max(floor);
    }
}

impl Sleep {
    pub fn set_hours(&mut self, hours: f64) {
        self.hours_slept = finite_or_zero(hours);
    }

    pub fn adjust_target(&mut self, delta: f64) {
        let (lo, hi) = SLEEP_TARGET_RANGE;
        self.target = (self.target + delta).clamp(lo, hi);
    }
}

impl Mindfulness {
    pub fn add_minutes(&mut self, delta: f64) {
        self.minutes = (self.minutes + delta).max(0.0);
    }

    pub fn adjust_target(&mut self, delta: f64) {
        self.target = (self.target + delta).max(MIN_MINDFULNESS_TARGET);
    }

    pub fn toggle_complete(&mut self) {
        self.is_complete = !self.is_complete;
    }

    fn sanitize(&mut self) {
        self.minutes = finite_or_zero(self.minutes);
        self.target = finite_or_zero(self.target);
    }
}

/// A single user-triggered mutation of the snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrackerAction {
    AddWater { amount: f64 },
    UndoWater,
    AdjustWaterTarget { delta: f64 },
    AddSteps { amount: f64 },
    UndoSteps,
    AdjustStepsTarget { delta: f64 },
    ToggleFasting,
    AdjustFastingGoal { minutes: f64 },
    SetSleep { hours: f64 },
    AdjustSleepTarget { delta: f64 },
    AddMindfulness { minutes: f64 },
    AdjustMindfulnessTarget { delta: f64 },
    ToggleMindfulnessComplete,
}

impl TrackerSnapshot {
    /// Replaces every non-finite number with 0 and caps undo history so the
    /// snapshot always serializes to JSON that deserializes again.
    pub fn sanitize(&mut self) {
        self.fasting.sanitize();
        self.water.sanitize();
        self.steps.sanitize();
        self.sleep.hours_slept = finite_or_zero(self.sleep.hours_slept);
        self.sleep.target = finite_or_zero(self.sleep.target);
        self.mindfulness.sanitize();
    }

    pub fn apply(&mut self, action: &TrackerAction, now: OffsetDateTime) {
        match *action {
            TrackerAction::AddWater { amount } => self.water.add(amount),
            TrackerAction::UndoWater => {
                self.water.undo();
            }
            TrackerAction::AdjustWaterTarget { delta } => {
                self.water.adjust_target(delta, MIN_WATER_TARGET)
            }
            TrackerAction::AddSteps { amount } => self.steps.add(amount),
            TrackerAction::UndoSteps => {
                self.steps.undo();
            }
            TrackerAction::AdjustStepsTarget { delta } => {
                self.steps.adjust_target(delta, MIN_STEPS_TARGET)
            }
            TrackerAction::ToggleFasting => self.fasting.toggle(now),
            TrackerAction::AdjustFastingGoal { minutes } => self.fasting.adjust_goal(minutes),
            TrackerAction::SetSleep { hours } => self.sleep.set_hours(hours),
            TrackerAction::AdjustSleepTarget { delta } => self.sleep.adjust_target(delta),
            TrackerAction::AddMindfulness { minutes } => self.mindfulness.add_minutes(minutes),
            TrackerAction::AdjustMindfulnessTarget { delta } => {
                self.mindfulness.adjust_target(delta)
            }
            TrackerAction::ToggleMindfulnessComplete => self.mindfulness.toggle_complete(),
        }
        self.sanitize();
    }
}
