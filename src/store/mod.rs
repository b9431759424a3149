//! Row store behind the social features: profiles, friend requests,
//! friendships, nudges and daily stats.

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::friends::lifecycle::Party;
use crate::friends::repo_types::{FriendRequest, FriendRequestStatus, Friendship, InsertOutcome};
use crate::nudges::repo_types::{Nudge, NudgeType};
use crate::profiles::repo_types::{Profile, ProfileChanges};
use crate::stats::repo_types::{DailyMetrics, UserStatsHistory};

#[cfg(test)]
pub mod memory;
pub mod pg;

#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Returns `None` when `invite_code` is already taken.
    async fn create_profile(
        &self,
        id: Uuid,
        name: &str,
        language: &str,
        invite_code: &str,
    ) -> anyhow::Result<Option<Profile>>;
    async fn profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>>;
    async fn profile_by_invite_code(&self, code: &str) -> anyhow::Result<Option<Profile>>;
    async fn profiles_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Profile>>;
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<Option<Profile>>;

    async fn insert_request(&self, from: Uuid, to: Uuid) -> anyhow::Result<InsertOutcome>;
    /// Pending requests where `user_id` is on the given side, newest first.
    async fn pending_requests(
        &self,
        user_id: Uuid,
        party: Party,
    ) -> anyhow::Result<Vec<FriendRequest>>;
    /// Marks a pending request accepted and inserts the friendship in one
    /// transaction. `None` when the request is no longer pending.
    async fn accept_request(&self, request: &FriendRequest) -> anyhow::Result<Option<Friendship>>;
    /// Moves a pending request owned by `actor` on the given side to `status`.
    async fn close_request(
        &self,
        request_id: Uuid,
        actor: Uuid,
        party: Party,
        status: FriendRequestStatus,
    ) -> anyhow::Result<Option<FriendRequest>>;
    async fn friendships_of(&self, user_id: Uuid) -> anyhow::Result<Vec<Friendship>>;

    async fn stats_on(&self, user_ids: &[Uuid], date: Date)
        -> anyhow::Result<Vec<UserStatsHistory>>;
    async fn stats_since(&self, user_id: Uuid, since: Date)
        -> anyhow::Result<Vec<UserStatsHistory>>;
    async fn upsert_stats(
        &self,
        user_id: Uuid,
        date: Date,
        metrics: &DailyMetrics,
    ) -> anyhow::Result<UserStatsHistory>;

    async fn insert_nudge(&self, from: Uuid, to: Uuid, kind: NudgeType) -> anyhow::Result<Nudge>;
    async fn nudges_to(&self, user_id: Uuid, limit: i64, offset: i64)
        -> anyhow::Result<Vec<Nudge>>;
}
