use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use uuid::Uuid;

/// Per (sender, target) cooldown after a nudge. Advisory: the
/// nudges table itself accepts any insert.
#[derive(Clone)]
pub struct NudgeCooldowns {
    window: Duration,
    last_sent: Arc<Mutex<HashMap<(Uuid, Uuid), Instant>>>,
}

impl NudgeCooldowns {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn left(&self, sent: Option<Instant>, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(sent?);
        self.window.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Time left before `from` may nudge `to` again, if any.
    pub fn remaining(&self, from: Uuid, to: Uuid, now: Instant) -> Option<Duration> {
        let map = self.last_sent.lock().unwrap_or_else(|p| p.into_inner());
        self.left(map.get(&(from, to)).copied(), now)
    }

    /// Claims the `(from, to)` slot at `now` unless it is still cooling down,
    /// in which case the time left is returned. Check and claim share one lock.
    pub fn reserve(&self, from: Uuid, to: Uuid, now: Instant) -> Result<(), Duration> {
        let mut map = self.last_sent.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(left) = self.left(map.get(&(from, to)).copied(), now) {
            return Err(left);
        }
        let window = self.window;
        map.retain(|_, sent| now.saturating_duration_since(*sent) < window);
        map.insert((from, to), now);
        Ok(())
    }

    /// Frees a slot claimed at `at`. A newer claim for the pair is kept.
    pub fn release(&self, from: Uuid, to: Uuid, at: Instant) {
        let mut map = self.last_sent.lock().unwrap_or_else(|p| p.into_inner());
        if map.get(&(from, to)) == Some(&at) {
            map.remove(&(from, to));
        }
    }
}
