use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::SocialStore;
use crate::friends::lifecycle::Party;
use crate::friends::repo_types::{FriendRequest, FriendRequestStatus, Friendship, InsertOutcome};
use crate::nudges::repo_types::{Nudge, NudgeType};
use crate::profiles::repo_types::{Profile, ProfileChanges};
use crate::stats::repo_types::{DailyMetrics, UserStatsHistory};

const PROFILE_COLUMNS: &str = "id, name, avatar_url, language, invite_code, \
     privacy_share_exact_numbers, created_at, updated_at";
const REQUEST_COLUMNS: &str = "id, from_user_id, to_user_id, status, created_at, updated_at";
const FRIENDSHIP_COLUMNS: &str = "id, user_id, friend_id, created_at";
const STATS_COLUMNS: &str = "id, user_id, date, daily_score, fasting_hours, water_ml, \
     sleep_hours, mindfulness_minutes, steps, fasting_streak, sleep_streak, \
     mindfulness_streak, steps_streak, created_at";
const NUDGE_COLUMNS: &str = "id, from_user_id, to_user_id, nudge_type, created_at";

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgSocialStore {
    db: PgPool,
}

impl PgSocialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl SocialStore for PgSocialStore {
    async fn create_profile(
        &self,
        id: Uuid,
        name: &str,
        language: &str,
        invite_code: &str,
    ) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            r#"
            INSERT INTO profiles (id, name, language, invite_code)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (invite_code) DO NOTHING
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(name)
            .bind(language)
            .bind(invite_code)
            .fetch_optional(&self.db)
            .await
            .context("insert profile")?;
        Ok(profile)
    }

    async fn profile(&self, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("get profile")?;
        Ok(profile)
    }

    async fn profile_by_invite_code(&self, code: &str) -> anyhow::Result<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE invite_code = $1");
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(code)
            .fetch_optional(&self.db)
            .await
            .context("get profile by invite code")?;
        Ok(profile)
    }

    async fn profiles_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ANY($1) ORDER BY name");
        let rows = sqlx::query_as::<_, Profile>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.db)
            .await
            .context("list profiles by ids")?;
        Ok(rows)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> anyhow::Result<Option<Profile>> {
        let sql = format!(
            r#"
            UPDATE profiles
               SET name = COALESCE($2, name),
                   avatar_url = COALESCE($3, avatar_url),
                   language = COALESCE($4, language),
                   privacy_share_exact_numbers = COALESCE($5, privacy_share_exact_numbers),
                   updated_at = now()
             WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.avatar_url.as_deref())
            .bind(changes.language.as_deref())
            .bind(changes.privacy_share_exact_numbers)
            .fetch_optional(&self.db)
            .await
            .context("update profile")?;
        Ok(profile)
    }

    async fn insert_request(&self, from: Uuid, to: Uuid) -> anyhow::Result<InsertOutcome> {
        let sql = format!(
            r#"
            INSERT INTO friend_requests (from_user_id, to_user_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING {REQUEST_COLUMNS}
            "#
        );
        match sqlx::query_as::<_, FriendRequest>(&sql)
            .bind(from)
            .bind(to)
            .fetch_one(&self.db)
            .await
        {
            Ok(request) => Ok(InsertOutcome::Inserted(request)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(anyhow::Error::new(e).context("insert friend request")),
        }
    }

    async fn pending_requests(
        &self,
        user_id: Uuid,
        party: Party,
    ) -> anyhow::Result<Vec<FriendRequest>> {
        let column = match party {
            Party::Sender => "from_user_id",
            Party::Recipient => "to_user_id",
        };
        let sql = format!(
            r#"
            SELECT {REQUEST_COLUMNS}
              FROM friend_requests
             WHERE {column} = $1 AND status = 'pending'
             ORDER BY created_at DESC
            "#
        );
        let rows = sqlx::query_as::<_, FriendRequest>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list pending requests")?;
        Ok(rows)
    }

    async fn accept_request(&self, request: &FriendRequest) -> anyhow::Result<Option<Friendship>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let accept_sql = format!(
            r#"
            UPDATE friend_requests
               SET status = 'accepted', updated_at = now()
             WHERE id = $1 AND to_user_id = $2 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "#
        );
        let accepted = sqlx::query_as::<_, FriendRequest>(&accept_sql)
            .bind(request.id)
            .bind(request.to_user_id)
            .fetch_optional(&mut *tx)
            .await
            .context("accept friend request")?;
        let Some(accepted) = accepted else {
            tx.rollback().await.context("rollback tx")?;
            return Ok(None);
        };

        // the accepting user is the `user_id` side
        let insert_sql = format!(
            r#"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING {FRIENDSHIP_COLUMNS}
            "#
        );
        let inserted = sqlx::query_as::<_, Friendship>(&insert_sql)
            .bind(accepted.to_user_id)
            .bind(accepted.from_user_id)
            .fetch_optional(&mut *tx)
            .await
            .context("insert friendship")?;

        let friendship = match inserted {
            Some(f) => f,
            None => {
                let existing_sql = format!(
                    r#"
                    SELECT {FRIENDSHIP_COLUMNS}
                      FROM friendships
                     WHERE (user_id = $1 AND friend_id = $2)
                        OR (user_id = $2 AND friend_id = $1)
                    "#
                );
                sqlx::query_as::<_, Friendship>(&existing_sql)
                    .bind(accepted.to_user_id)
                    .bind(accepted.from_user_id)
                    .fetch_one(&mut *tx)
                    .await
                    .context("load existing friendship")?
            }
        };

        tx.commit().await.context("commit tx")?;
        Ok(Some(friendship))
    }

    async fn close_request(
        &self,
        request_id: Uuid,
        actor: Uuid,
        party: Party,
        status: FriendRequestStatus,
    ) -> anyhow::Result<Option<FriendRequest>> {
        let column = match party {
            Party::Sender => "from_user_id",
            Party::Recipient => "to_user_id",
        };
        let sql = format!(
            r#"
            UPDATE friend_requests
               SET status = $3, updated_at = now()
             WHERE id = $1 AND {column} = $2 AND status = 'pending'
            RETURNING {REQUEST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, FriendRequest>(&sql)
            .bind(request_id)
            .bind(actor)
            .bind(status)
            .fetch_optional(&self.db)
            .await
            .context("update friend request status")?;
        Ok(row)
    }

    async fn friendships_of(&self, user_id: Uuid) -> anyhow::Result<Vec<Friendship>> {
        let sql = format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
              FROM friendships
             WHERE user_id = $1 OR friend_id = $1
             ORDER BY created_at ASC
            "#
        );
        let rows = sqlx::query_as::<_, Friendship>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .context("list friendships")?;
        Ok(rows)
    }

    async fn stats_on(
        &self,
        user_ids: &[Uuid],
        date: Date,
    ) -> anyhow::Result<Vec<UserStatsHistory>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {STATS_COLUMNS} FROM user_stats_history WHERE user_id = ANY($1) AND date = $2"
        );
        let rows = sqlx::query_as::<_, UserStatsHistory>(&sql)
            .bind(user_ids.to_vec())
            .bind(date)
            .fetch_all(&self.db)
            .await
            .context("list stats for date")?;
        Ok(rows)
    }

    async fn stats_since(
        &self,
        user_id: Uuid,
        since: Date,
    ) -> anyhow::Result<Vec<UserStatsHistory>> {
        let sql = format!(
            r#"
            SELECT {STATS_COLUMNS}
              FROM user_stats_history
             WHERE user_id = $1 AND date >= $2
             ORDER BY date ASC
            "#
        );
        let rows = sqlx::query_as::<_, UserStatsHistory>(&sql)
            .bind(user_id)
            .bind(since)
            .fetch_all(&self.db)
            .await
            .context("list stats history")?;
        Ok(rows)
    }

    async fn upsert_stats(
        &self,
        user_id: Uuid,
        date: Date,
        m: &DailyMetrics,
    ) -> anyhow::Result<UserStatsHistory> {
        let sql = format!(
            r#"
            INSERT INTO user_stats_history
                (user_id, date, daily_score, fasting_hours, water_ml,
                 sleep_hours, mindfulness_minutes, steps)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, date) DO UPDATE
               SET daily_score = EXCLUDED.daily_score,
                   fasting_hours = EXCLUDED.fasting_hours,
                   water_ml = EXCLUDED.water_ml,
                   sleep_hours = EXCLUDED.sleep_hours,
                   mindfulness_minutes = EXCLUDED.mindfulness_minutes,
                   steps = EXCLUDED.steps
            RETURNING {STATS_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserStatsHistory>(&sql)
            .bind(user_id)
            .bind(date)
            .bind(m.daily_score)
            .bind(m.fasting_hours)
            .bind(m.water_ml)
            .bind(m.sleep_hours)
            .bind(m.mindfulness_minutes)
            .bind(m.steps)
            .fetch_one(&self.db)
            .await
            .context("upsert stats row")?;
        Ok(row)
    }

    async fn insert_nudge(&self, from: Uuid, to: Uuid, kind: NudgeType) -> anyhow::Result<Nudge> {
        let sql = format!(
            r#"
            INSERT INTO nudges (from_user_id, to_user_id, nudge_type)
            VALUES ($1, $2, $3)
            RETURNING {NUDGE_COLUMNS}
            "#
        );
        let nudge = sqlx::query_as::<_, Nudge>(&sql)
            .bind(from)
            .bind(to)
            .bind(kind)
            .fetch_one(&self.db)
            .await
            .context("insert nudge")?;
        Ok(nudge)
    }

    async fn nudges_to(&self, user_id: Uuid, limit: i64, offset: i64) -> anyhow::Result<Vec<Nudge>> {
        let sql = format!(
            r#"
            SELECT {NUDGE_COLUMNS}
              FROM nudges
             WHERE to_user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, Nudge>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .context("list nudges")?;
        Ok(rows)
    }
}
