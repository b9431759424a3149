use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Public profile of a user. One row per account, created at sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub language: String,
    pub invite_code: String,                    // unique, shareable
    pub privacy_share_exact_numbers: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields a user may change on their own profile. `None` leaves the column as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub language: Option<String>,
    pub privacy_share_exact_numbers: Option<bool>,
}
