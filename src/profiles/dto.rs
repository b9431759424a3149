use serde::Deserialize;

use super::repo_types::ProfileChanges;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub language: Option<String>,
    pub privacy_share_exact_numbers: Option<bool>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            name: r.name,
            avatar_url: r.avatar_url,
            language: r.language,
            privacy_share_exact_numbers: r.privacy_share_exact_numbers,
        }
    }
}
