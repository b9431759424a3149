use std::sync::Mutex;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::SocialStore;
use crate::friends::lifecycle::Party;
use crate::friends::repo_types::{FriendRequest, FriendRequestStatus, Friendship, InsertOutcome};
use crate::nudges::repo_types::{Nudge, NudgeType};
use crate::profiles::repo_types::{Profile, ProfileChanges};
use crate::stats::repo_types::{DailyMetrics, UserStatsHistory};

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    requests: Vec<FriendRequest>,
    friendships: Vec<Friendship>,
    stats: Vec<UserStatsHistory>,
    nudges: Vec<Nudge>,
}

/// In-process store with the same constraints as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// When set, every nudge insert fails.
    pub fail_nudges: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, id: Uuid) -> Option<FriendRequest> {
        let t = self.tables.lock().unwrap();
        t.requests.iter().find(|r| r.id == id).cloned()
    }

    pub fn all_friendships(&self) -> Vec<Friendship> {
        self.tables.lock().unwrap().friendships.clone()
    }

    pub fn all_nudges(&self) -> Vec<Nudge> {
        self.tables.lock().unwrap().nudges.clone()
    }

    pub fn set_streaks(&self, user_id: Uuid, date: Date, streak: i32) {
        let mut t = self.tables.lock().unwrap();
        if let Some(row) = t.stats.iter_mut().find(|s| s.user_id == user_id && s.date == date) {
            row.fasting_streak = streak;
            row.sleep_streak = streak;
            row.mindfulness_streak = streak;
            row.steps_streak = streak;
        }
    }
}

fn side(r: &FriendRequest, party: Party) -> Uuid {
    match party {
        Party::Sender => r.from_user_id,
        Party::Recipient => r.to_user_id,
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn create_profile(
        &self,
        id: Uuid,
        name: &str,
        language: &str,
        invite_code: &str,
    ) -> anyhow::Result<Option<Profile>> {
        let mut t = self.tables.lock().unwrap();
        if t.profiles.iter().any(|p| p.invite_code == invite_code) {
            return Ok(None);
        }
        anyhow::ensure!(!t.profiles.iter().any(|p| p.id == id), "profile exists");
        let now = OffsetDateTime::now_utc();
        let profile = Profile {
            id,
            name: name.to_string(),
            avatar_url: None,
            language: language.to_string(),
            invite_code: invite_code.to_string(),
            privacy_share_exact_numbers: true,
            created_at: now,
            updated_at: now,
        };
        t.profiles.push(profile.clone());
        Ok(Some(profile))
    }

    async fn profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let t = self.tables.lock().unwrap();
        Ok(t.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn profile_by_invite_code(&self, code: &str) -> anyhow::Result<Option<Profile>> {
        let t = self.tables.lock().unwrap();
        Ok(t.profiles.iter().find(|p| p.invite_code == code).cloned())
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Profile>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Profile> = t
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<Option<Profile>> {
        let mut t = self.tables.lock().unwrap();
        let Some(p) = t.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            p.name = name.clone();
        }
        if let Some(url) = &changes.avatar_url {
            p.avatar_url = Some(url.clone());
        }
        if let Some(lang) = &changes.language {
            p.language = lang.clone();
        }
        if let Some(share) = changes.privacy_share_exact_numbers {
            p.privacy_share_exact_numbers = share;
        }
        p.updated_at = OffsetDateTime::now_utc();
        Ok(Some(p.clone()))
    }

    async fn insert_request(&self, from: Uuid, to: Uuid) -> anyhow::Result<InsertOutcome> {
        let mut t = self.tables.lock().unwrap();
        let duplicate = t.requests.iter().any(|r| {
            r.from_user_id == from && r.to_user_id == to && r.status == FriendRequestStatus::Pending
        });
        if duplicate {
            return Ok(InsertOutcome::Duplicate);
        }
        let now = OffsetDateTime::now_utc();
        let request = FriendRequest {
            id: Uuid::new_v4(),
            from_user_id: from,
            to_user_id: to,
            status: FriendRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        t.requests.push(request.clone());
        Ok(InsertOutcome::Inserted(request))
    }

    async fn pending_requests(
        &self,
        user_id: Uuid,
        party: Party,
    ) -> anyhow::Result<Vec<FriendRequest>> {
        let t = self.tables.lock().unwrap();
        Ok(t.requests
            .iter()
            .rev()
            .filter(|r| side(r, party) == user_id && r.status == FriendRequestStatus::Pending)
            .cloned()
            .collect())
    }

    async fn accept_request(&self, request: &FriendRequest) -> anyhow::Result<Option<Friendship>> {
        let mut t = self.tables.lock().unwrap();
        let Some(row) = t.requests.iter_mut().find(|r| {
            r.id == request.id
                && r.to_user_id == request.to_user_id
                && r.status == FriendRequestStatus::Pending
        }) else {
            return Ok(None);
        };
        row.status = FriendRequestStatus::Accepted;
        row.updated_at = OffsetDateTime::now_utc();
        let (user_id, friend_id) = (row.to_user_id, row.from_user_id);

        if let Some(existing) = t
            .friendships
            .iter()
            .find(|f| f.other(user_id) == Some(friend_id))
        {
            return Ok(Some(existing.clone()));
        }
        let friendship = Friendship {
            id: Uuid::new_v4(),
            user_id,
            friend_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.friendships.push(friendship.clone());
        Ok(Some(friendship))
    }

    async fn close_request(
        &self,
        request_id: Uuid,
        actor: Uuid,
        party: Party,
        status: FriendRequestStatus,
    ) -> anyhow::Result<Option<FriendRequest>> {
        let mut t = self.tables.lock().unwrap();
        let Some(row) = t.requests.iter_mut().find(|r| {
            r.id == request_id && side(r, party) == actor && r.status == FriendRequestStatus::Pending
        }) else {
            return Ok(None);
        };
        row.status = status;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn friendships_of(&self, user_id: Uuid) -> anyhow::Result<Vec<Friendship>> {
        let t = self.tables.lock().unwrap();
        Ok(t.friendships
            .iter()
            .filter(|f| f.other(user_id).is_some())
            .cloned()
            .collect())
    }

    async fn stats_on(
        &self,
        user_ids: &[Uuid],
        date: Date,
    ) -> anyhow::Result<Vec<UserStatsHistory>> {
        let t = self.tables.lock().unwrap();
        Ok(t.stats
            .iter()
            .filter(|s| user_ids.contains(&s.user_id) && s.date == date)
            .cloned()
            .collect())
    }

    async fn stats_since(
        &self,
        user_id: Uuid,
        since: Date,
    ) -> anyhow::Result<Vec<UserStatsHistory>> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<UserStatsHistory> = t
            .stats
            .iter()
            .filter(|s| s.user_id == user_id && s.date >= since)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.date);
        Ok(rows)
    }

    async fn upsert_stats(
        &self,
        user_id: Uuid,
        date: Date,
        m: &DailyMetrics,
    ) -> anyhow::Result<UserStatsHistory> {
        let mut t = self.tables.lock().unwrap();
        if let Some(row) = t.stats.iter_mut().find(|s| s.user_id == user_id && s.date == date) {
            row.daily_score = m.daily_score;
            row.fasting_hours = m.fasting_hours;
            row.water_ml = m.water_ml;
            row.sleep_hours = m.sleep_hours;
            row.mindfulness_minutes = m.mindfulness_minutes;
            row.steps = m.steps;
            return Ok(row.clone());
        }
        let row = UserStatsHistory {
            id: Uuid::new_v4(),
            user_id,
            date,
            daily_score: m.daily_score,
            fasting_hours: m.fasting_hours,
            water_ml: m.water_ml,
            sleep_hours: m.sleep_hours,
            mindfulness_minutes: m.mindfulness_minutes,
            steps: m.steps,
            fasting_streak: 0,
            sleep_streak: 0,
            mindfulness_streak: 0,
            steps_streak: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        t.stats.push(row.clone());
        Ok(row)
    }

    async fn insert_nudge(&self, from: Uuid, to: Uuid, kind: NudgeType) -> anyhow::Result<Nudge> {
        if self.fail_nudges.load(std::sync::atomic::Ordering::SeqCst) {
            anyhow::bail!("nudges table unavailable");
        }
        let mut t = self.tables.lock().unwrap();
        let nudge = Nudge {
            id: Uuid::new_v4(),
            from_user_id: from,
            to_user_id: to,
            nudge_type: kind,
            created_at: OffsetDateTime::now_utc(),
        };
        t.nudges.push(nudge.clone());
        Ok(nudge)
    }

    async fn nudges_to(&self, user_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Nudge>> {
        let t = self.tables.lock().unwrap();
        Ok(t.nudges
            .iter()
            .rev()
            .filter(|n| n.to_user_id == user_id)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
