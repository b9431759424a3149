use serde::Deserialize;
use uuid::Uuid;

use super::repo_types::NudgeType;

#[derive(Debug, Deserialize)]
pub struct SendNudgeRequest {
    pub to_user_id: Uuid,
    pub nudge_type: NudgeType,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}
