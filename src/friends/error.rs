use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum FriendError {
    #[error("Enter an invite code")]
    EmptyCode,
    #[error("Invalid invite code")]
    InvalidCode,
    #[error("You can't add yourself")]
    SelfAdd,
    #[error("Friend request already sent")]
    AlreadySent,
    #[error("You are already friends")]
    AlreadyFriends,
    #[error("Not a friend")]
    NotFriends,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl FriendError {
    pub fn status(&self) -> StatusCode {
        match self {
            FriendError::EmptyCode | FriendError::SelfAdd => StatusCode::BAD_REQUEST,
            FriendError::InvalidCode | FriendError::ProfileNotFound => StatusCode::NOT_FOUND,
            FriendError::AlreadySent | FriendError::AlreadyFriends => StatusCode::CONFLICT,
            FriendError::NotFriends => StatusCode::FORBIDDEN,
            FriendError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_validation(&self) -> bool {
        !matches!(self, FriendError::Store(_))
    }
}
