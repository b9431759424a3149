//! Friend request state machine.
//!
//! ```text
//! pending ──accept──▶ accepted
//!    │ ──decline──▶ declined
//!    └ ──cancel───▶ cancelled
//! ```
//!
//! Terminal states never move again. Sending a new request after a decline or
//! cancel creates a fresh row.

use uuid::Uuid;

use super::repo_types::{FriendRequest, FriendRequestStatus};

/// Which side of a request an action is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Recipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Decline,
    Cancel,
}

impl RequestAction {
    pub fn target(self) -> FriendRequestStatus {
        match self {
            RequestAction::Accept => FriendRequestStatus::Accepted,
            RequestAction::Decline => FriendRequestStatus::Declined,
            RequestAction::Cancel => FriendRequestStatus::Cancelled,
        }
    }

    /// Only the recipient answers a request; only the sender withdraws it.
    pub fn party(self) -> Party {
        match self {
            RequestAction::Accept | RequestAction::Decline => Party::Recipient,
            RequestAction::Cancel => Party::Sender,
        }
    }
}

impl FriendRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, FriendRequestStatus::Pending)
    }

    pub fn transition(self, action: RequestAction) -> Option<FriendRequestStatus> {
        match self {
            FriendRequestStatus::Pending => Some(action.target()),
            _ => None,
        }
    }
}

impl FriendRequest {
    pub fn party_of(&self, user_id: Uuid) -> Option<Party> {
        if self.from_user_id == user_id {
            Some(Party::Sender)
        } else if self.to_user_id == user_id {
            Some(Party::Recipient)
        } else {
            None
        }
    }

    /// The status `actor` would move this request to, if the action is allowed.
    pub fn next_status(&self, actor: Uuid, action: RequestAction) -> Option<FriendRequestStatus> {
        if self.party_of(actor) != Some(action.party()) {
            return None;
        }
        self.status.transition(action)
    }
}
