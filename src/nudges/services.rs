use std::time::Instant;

use axum::http::StatusCode;
use tracing::info;
use uuid::Uuid;

use super::{
    cooldown::NudgeCooldowns,
    repo_types::{Nudge, NudgeType},
};
use crate::{friends::services::friend_ids, store::SocialStore};

#[derive(Debug, thiserror::Error)]
pub enum NudgeError {
    #[error("You can't nudge yourself")]
    SelfNudge,
    #[error("You can only nudge friends")]
    NotFriends,
    #[error("Please wait {remaining_secs}s before nudging again")]
    CoolingDown { remaining_secs: u64 },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl NudgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            NudgeError::SelfNudge => StatusCode::BAD_REQUEST,
            NudgeError::NotFriends => StatusCode::FORBIDDEN,
            NudgeError::CoolingDown { .. } => StatusCode::TOO_MANY_REQUESTS,
            NudgeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Inserts a nudge unless `from` is still cooling down for `to`. The cooldown
/// slot is claimed before the store calls and given back if they fail, so only
/// a successful insert leaves a cooldown behind.
pub async fn send_nudge(
    store: &dyn SocialStore,
    cooldowns: &NudgeCooldowns,
    from: Uuid,
    to: Uuid,
    kind: NudgeType,
    now: Instant,
) -> Result<Nudge, NudgeError> {
    if from == to {
        return Err(NudgeError::SelfNudge);
    }
    cooldowns
        .reserve(from, to, now)
        .map_err(|left| NudgeError::CoolingDown {
            remaining_secs: left.as_secs().max(1),
        })?;

    match insert_for_friend(store, from, to, kind).await {
        Ok(nudge) => {
            info!(%from, %to, kind = ?kind, "nudge sent {}", kind.emoji());
            Ok(nudge)
        }
        Err(e) => {
            cooldowns.release(from, to, now);
            Err(e)
        }
    }
}

async fn insert_for_friend(
    store: &dyn SocialStore,
    from: Uuid,
    to: Uuid,
    kind: NudgeType,
) -> Result<Nudge, NudgeError> {
    if !friend_ids(store, from).await?.contains(&to) {
        return Err(NudgeError::NotFriends);
    }
    Ok(store.insert_nudge(from, to, kind).await?)
}
