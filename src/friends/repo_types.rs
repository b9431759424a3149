use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo_types::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: FriendRequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Stored as one directed row; the pair is unique in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Friendship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Friendship {
    /// The party that is not `me`, or `None` when `me` is not part of this row.
    pub fn other(&self, me: Uuid) -> Option<Uuid> {
        if self.user_id == me {
            Some(self.friend_id)
        } else if self.friend_id == me {
            Some(self.user_id)
        } else {
            None
        }
    }
}

/// A pending request joined with the profile on the other side.
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithProfile {
    #[serde(flatten)]
    pub request: FriendRequest,
    pub profile: Profile,
}

/// Result of inserting a request against the pending-pair uniqueness constraint.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Inserted(FriendRequest),
    Duplicate,
}
