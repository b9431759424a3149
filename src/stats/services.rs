use time::{Date, Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use super::repo_types::{DailyMetrics, UserStatsHistory};
use crate::{score, store::SocialStore, tracker::model::TrackerSnapshot};

pub const DEFAULT_HISTORY_DAYS: i64 = 7;
pub const MAX_HISTORY_DAYS: i64 = 365;

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn one_decimal(v: f64) -> f64 {
    (finite_or_zero(v) * 10.0).round() / 10.0
}

// `as` saturates and maps NaN to 0
fn whole(v: f64) -> i32 {
    v.round() as i32
}

/// Flattens a snapshot into the values stored for the day.
pub fn daily_metrics(snapshot: &TrackerSnapshot, now: OffsetDateTime) -> DailyMetrics {
    DailyMetrics {
        daily_score: i32::from(score::compute_daily_score(snapshot, now)),
        fasting_hours: one_decimal(snapshot.fasting.effective_hours(now)),
        water_ml: whole(snapshot.water.current),
        sleep_hours: one_decimal(snapshot.sleep.hours_slept),
        mindfulness_minutes: whole(snapshot.mindfulness.minutes),
        steps: whole(snapshot.steps.current),
    }
}

/// Writes today's row for `user_id`. Streak columns keep whatever they held.
pub async fn record_day(
    store: &dyn SocialStore,
    user_id: Uuid,
    snapshot: &TrackerSnapshot,
    now: OffsetDateTime,
) -> anyhow::Result<UserStatsHistory> {
    let metrics = daily_metrics(snapshot, now);
    let row = store.upsert_stats(user_id, now.date(), &metrics).await?;
    info!(%user_id, date = %row.date, score = row.daily_score, "daily stats recorded");
    Ok(row)
}

pub async fn history(
    store: &dyn SocialStore,
    user_id: Uuid,
    today: Date,
    days: i64,
) -> anyhow::Result<Vec<UserStatsHistory>> {
    let days = days.clamp(0, MAX_HISTORY_DAYS);
    store
        .stats_since(user_id, today - Duration::days(days))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use time::macros::{date, datetime};

    #[test]
    fn flattens_snapshot() {
        let mut s = TrackerSnapshot::default();
        s.fasting.is_active = true;
        s.fasting.start_time = Some(datetime!(2024-05-10 02:00 UTC));
        s.water.current = 1249.6;
        s.sleep.hours_slept = f64::NAN;
        s.mindfulness.minutes = 12.0;
        s.steps.current = 8000.0;

        let m = daily_metrics(&s, datetime!(2024-05-10 10:20 UTC));
        assert_eq!(m.fasting_hours, 8.3);
        assert_eq!(m.water_ml, 1250);
        assert_eq!(m.sleep_hours, 0.0);
        assert_eq!(m.mindfulness_minutes, 12);
        assert_eq!(m.steps, 8000);
        assert!((0..=100).contains(&m.daily_score));
    }

    #[tokio::test]
    async fn recording_twice_updates_the_same_day() {
        let store = MemoryStore::new();
        let me = Uuid::new_v4();
        let now = datetime!(2024-05-10 20:00 UTC);

        let mut s = TrackerSnapshot::default();
        s.steps.current = 10000.0;
        let first = record_day(&store, me, &s, now).await.unwrap();
        assert_eq!(first.daily_score, 10);
        store.set_streaks(me, now.date(), 2);

        s.sleep.hours_slept = 8.0;
        let second = record_day(&store, me, &s, now).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.daily_score, 35);
        assert_eq!(second.steps_streak, 2);

        let rows = history(&store, me, date!(2024-05-10), DEFAULT_HISTORY_DAYS)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
