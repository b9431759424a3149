use anyhow::Context;
use rand::{distributions::Uniform, Rng};
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{Profile, ProfileChanges};
use crate::store::SocialStore;

pub const INVITE_CODE_LEN: usize = 8;
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 5;

pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    let dist = Uniform::from(0..INVITE_ALPHABET.len());
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.sample(dist)] as char)
        .collect()
}

/// Invite codes are matched case-insensitively; stored codes are upper case.
pub fn normalize_invite_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Creates the profile for a new account, retrying on invite code collisions.
pub async fn create_profile(
    store: &dyn SocialStore,
    user_id: Uuid,
    name: &str,
    language: &str,
) -> anyhow::Result<Profile> {
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = generate_invite_code();
        if let Some(profile) = store
            .create_profile(user_id, name, language, &code)
            .await
            .context("create profile")?
        {
            info!(%user_id, invite_code = %profile.invite_code, "profile created");
            return Ok(profile);
        }
        warn!(%user_id, attempt, "invite code collision");
    }
    anyhow::bail!("could not allocate a unique invite code")
}

/// Default display name: the local part of the email address.
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("unsupported language code")]
    BadLanguage,
}

/// Trims and checks user-supplied profile changes.
pub fn validate_changes(mut changes: ProfileChanges) -> Result<ProfileChanges, ProfileError> {
    if let Some(name) = changes.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
    }
    if let Some(lang) = changes.language.as_mut() {
        *lang = lang.trim().to_lowercase();
        let ok = (2..=5).contains(&lang.len())
            && lang.chars().all(|c| c.is_ascii_lowercase() || c == '-');
        if !ok {
            return Err(ProfileError::BadLanguage);
        }
    }
    Ok(changes)
}
