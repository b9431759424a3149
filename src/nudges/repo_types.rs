use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "nudge_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NudgeType {
    Hydrate,
    Walk,
    Sleep,
    Encourage,
}

impl NudgeType {
    pub fn emoji(self) -> &'static str {
        match self {
            NudgeType::Hydrate => "💧",
            NudgeType::Walk => "👣",
            NudgeType::Sleep => "😴",
            NudgeType::Encourage => "🌟",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Nudge {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub nudge_type: NudgeType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
