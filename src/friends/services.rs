use std::collections::{HashMap, HashSet};

use time::{Date, Duration};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    dto::{FriendProfileView, FriendSummary, HistoryPoint, Streaks},
    error::FriendError,
    lifecycle::{Party, RequestAction},
    privacy::metric_cards,
    repo_types::{FriendRequest, Friendship, InsertOutcome, RequestWithProfile},
};
use crate::{
    profiles::{repo_types::Profile, services::normalize_invite_code},
    score::score_message,
    store::SocialStore,
};

pub const HISTORY_DAYS: i64 = 7;

/// Resolves an invite code to its owner and sends them a request.
pub async fn send_request_by_code(
    store: &dyn SocialStore,
    me: Uuid,
    invite_code: &str,
) -> Result<FriendRequest, FriendError> {
    let code = normalize_invite_code(invite_code);
    if code.is_empty() {
        return Err(FriendError::EmptyCode);
    }
    let target = store
        .profile_by_invite_code(&code)
        .await?
        .ok_or(FriendError::InvalidCode)?;
    send_request(store, me, target.id).await
}

pub async fn send_request(
    store: &dyn SocialStore,
    from: Uuid,
    to: Uuid,
) -> Result<FriendRequest, FriendError> {
    if from == to {
        return Err(FriendError::SelfAdd);
    }
    if friend_ids(store, from).await?.contains(&to) {
        return Err(FriendError::AlreadyFriends);
    }
    match store.insert_request(from, to).await? {
        InsertOutcome::Inserted(request) => {
            info!(request_id = %request.id, %from, %to, "friend request sent");
            Ok(request)
        }
        InsertOutcome::Duplicate => Err(FriendError::AlreadySent),
    }
}

async fn with_profiles(
    store: &dyn SocialStore,
    requests: Vec<FriendRequest>,
    other: impl Fn(&FriendRequest) -> Uuid,
) -> anyhow::Result<Vec<RequestWithProfile>> {
    let ids: Vec<Uuid> = requests.iter().map(&other).collect();
    let profiles: HashMap<Uuid, Profile> = store
        .profiles_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    Ok(requests
        .into_iter()
        .filter_map(|request| {
            let profile = profiles.get(&other(&request))?.clone();
            Some(RequestWithProfile { request, profile })
        })
        .collect())
}

pub async fn incoming_requests(
    store: &dyn SocialStore,
    me: Uuid,
) -> anyhow::Result<Vec<RequestWithProfile>> {
    let requests = store.pending_requests(me, Party::Recipient).await?;
    with_profiles(store, requests, |r| r.from_user_id).await
}

pub async fn outgoing_requests(
    store: &dyn SocialStore,
    me: Uuid,
) -> anyhow::Result<Vec<RequestWithProfile>> {
    let requests = store.pending_requests(me, Party::Sender).await?;
    with_profiles(store, requests, |r| r.to_user_id).await
}

/// Accepts one of `me`'s incoming pending requests and records the friendship.
/// Requests outside that set are left untouched and yield `None`.
pub async fn accept_request(
    store: &dyn SocialStore,
    me: Uuid,
    request_id: Uuid,
) -> anyhow::Result<Option<Friendship>> {
    let incoming = store.pending_requests(me, Party::Recipient).await?;
    let Some(request) = incoming.into_iter().find(|r| r.id == request_id) else {
        debug!(%me, %request_id, "accept ignored: not an incoming pending request");
        return Ok(None);
    };
    if request.next_status(me, RequestAction::Accept).is_none() {
        return Ok(None);
    }

    let friendship = store.accept_request(&request).await?;
    if let Some(f) = &friendship {
        info!(%request_id, user_id = %f.user_id, friend_id = %f.friend_id, "friend request accepted");
    }
    Ok(friendship)
}

async fn close(
    store: &dyn SocialStore,
    me: Uuid,
    request_id: Uuid,
    action: RequestAction,
) -> anyhow::Result<Option<FriendRequest>> {
    let updated = store
        .close_request(request_id, me, action.party(), action.target())
        .await?;
    match &updated {
        Some(r) => info!(%request_id, status = ?r.status, "friend request closed"),
        None => debug!(%me, %request_id, ?action, "close ignored"),
    }
    Ok(updated)
}

pub async fn decline_request(
    store: &dyn SocialStore,
    me: Uuid,
    request_id: Uuid,
) -> anyhow::Result<Option<FriendRequest>> {
    close(store, me, request_id, RequestAction::Decline).await
}

pub async fn cancel_request(
    store: &dyn SocialStore,
    me: Uuid,
    request_id: Uuid,
) -> anyhow::Result<Option<FriendRequest>> {
    close(store, me, request_id, RequestAction::Cancel).await
}

/// Ids of everyone `me` is friends with, in either column, without repeats.
pub async fn friend_ids(store: &dyn SocialStore, me: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let mut seen = HashSet::new();
    Ok(store
        .friendships_of(me)
        .await?
        .iter()
        .filter_map(|f| f.other(me))
        .filter(|id| seen.insert(*id))
        .collect())
}

pub async fn list_friends(
    store: &dyn SocialStore,
    me: Uuid,
    today: Date,
) -> anyhow::Result<Vec<FriendSummary>> {
    let ids = friend_ids(store, me).await?;
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let profiles = store.profiles_by_ids(&ids).await?;
    let stats: HashMap<Uuid, _> = store
        .stats_on(&ids, today)
        .await?
        .into_iter()
        .map(|s| (s.user_id, s))
        .collect();

    Ok(profiles
        .into_iter()
        .map(|profile| {
            let today_stats = stats.get(&profile.id);
            FriendSummary {
                daily_score: today_stats.map(|s| s.daily_score).unwrap_or(0),
                streaks: today_stats.map(Streaks::from).unwrap_or_default(),
                profile,
            }
        })
        .collect())
}

pub async fn friend_profile(
    store: &dyn SocialStore,
    me: Uuid,
    friend_id: Uuid,
    today: Date,
) -> Result<FriendProfileView, FriendError> {
    if !friend_ids(store, me).await?.contains(&friend_id) {
        return Err(FriendError::NotFriends);
    }
    let profile = store
        .profile(friend_id)
        .await?
        .ok_or(FriendError::ProfileNotFound)?;

    let since = today - Duration::days(HISTORY_DAYS);
    let history = store.stats_since(friend_id, since).await?;
    let today_stats = history.iter().find(|s| s.date == today);

    let daily_score = today_stats.map(|s| s.daily_score).unwrap_or(0);
    let share_exact = profile.privacy_share_exact_numbers;
    Ok(FriendProfileView {
        daily_score,
        message: score_message(daily_score),
        share_exact_numbers: share_exact,
        metrics: metric_cards(today_stats, share_exact),
        history: history
            .iter()
            .map(|s| HistoryPoint {
                date: s.date,
                daily_score: s.daily_score,
            })
            .collect(),
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::friends::repo_types::FriendRequestStatus;
    use crate::profiles::repo_types::ProfileChanges;
    use crate::profiles::services::create_profile;
    use crate::stats::repo_types::DailyMetrics;
    use crate::store::memory::MemoryStore;
    use time::macros::date;

    const TODAY: Date = date!(2024-05-10);

    async fn user(store: &MemoryStore, name: &str) -> Profile {
        create_profile(store, Uuid::new_v4(), name, "en")
            .await
            .expect("profile")
    }

    async fn befriend(store: &MemoryStore, a: &Profile, b: &Profile) {
        let req = send_request(store, a.id, b.id).await.expect("send");
        accept_request(store, b.id, req.id)
            .await
            .expect("accept")
            .expect("friendship");
    }

    fn metrics(score: i32) -> DailyMetrics {
        DailyMetrics {
            daily_score: score,
            fasting_hours: 8.0,
            water_ml: 1250,
            sleep_hours: 8.0,
            mindfulness_minutes: 10,
            steps: 5000,
        }
    }

    #[tokio::test]
    async fn self_add_always_fails() {
        let store = MemoryStore::new();
        let anyone = Uuid::new_v4();
        let err = send_request(&store, anyone, anyone).await.unwrap_err();
        assert!(matches!(err, FriendError::SelfAdd));

        let me = user(&store, "me").await;
        let err = send_request_by_code(&store, me.id, &me.invite_code.to_lowercase())
            .await
            .unwrap_err();
        assert!(matches!(err, FriendError::SelfAdd));
    }

    #[tokio::test]
    async fn invite_code_validation() {
        let store = MemoryStore::new();
        let me = user(&store, "me").await;

        let err = send_request_by_code(&store, me.id, "   ").await.unwrap_err();
        assert!(matches!(err, FriendError::EmptyCode));
        let err = send_request_by_code(&store, me.id, "NOPE0000").await.unwrap_err();
        assert!(matches!(err, FriendError::InvalidCode));
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_pending_request_is_rejected() {
        let store = MemoryStore::new();
        let (alice, bob) = (user(&store, "alice").await, user(&store, "bob").await);

        let first = send_request_by_code(&store, alice.id, &bob.invite_code).await.unwrap();
        assert_eq!(first.status, FriendRequestStatus::Pending);
        let err = send_request_by_code(&store, alice.id, &bob.invite_code)
            .await
            .unwrap_err();
        assert!(matches!(err, FriendError::AlreadySent));
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn accept_creates_friendship_with_accepter_as_user() {
        let store = MemoryStore::new();
        let (alice, bob) = (user(&store, "alice").await, user(&store, "bob").await);
        let req = send_request(&store, alice.id, bob.id).await.unwrap();

        let incoming = incoming_requests(&store, bob.id).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].profile.id, alice.id);
        let outgoing = outgoing_requests(&store, alice.id).await.unwrap();
        assert_eq!(outgoing[0].profile.id, bob.id);

        let f = accept_request(&store, bob.id, req.id).await.unwrap().unwrap();
        assert_eq!((f.user_id, f.friend_id), (bob.id, alice.id));
        assert_eq!(store.request(req.id).unwrap().status, FriendRequestStatus::Accepted);
        assert!(incoming_requests(&store, bob.id).await.unwrap().is_empty());

        // terminal: a second accept changes nothing
        assert!(accept_request(&store, bob.id, req.id).await.unwrap().is_none());
        assert_eq!(store.all_friendships().len(), 1);
    }

    #[tokio::test]
    async fn accept_outside_incoming_pending_is_noop() {
        let store = MemoryStore::new();
        let (alice, bob) = (user(&store, "alice").await, user(&store, "bob").await);
        let req = send_request(&store, alice.id, bob.id).await.unwrap();

        // the sender cannot accept their own request
        assert!(accept_request(&store, alice.id, req.id).await.unwrap().is_none());
        // unknown id
        assert!(accept_request(&store, bob.id, Uuid::new_v4()).await.unwrap().is_none());

        assert_eq!(store.request(req.id).unwrap().status, FriendRequestStatus::Pending);
        assert!(store.all_friendships().is_empty());
    }

    #[tokio::test]
    async fn decline_and_cancel_respect_sides() {
        let store = MemoryStore::new();
        let (alice, bob) = (user(&store, "alice").await, user(&store, "bob").await);
        let req = send_request(&store, alice.id, bob.id).await.unwrap();

        assert!(decline_request(&store, alice.id, req.id).await.unwrap().is_none());
        assert!(cancel_request(&store, bob.id, req.id).await.unwrap().is_none());

        let declined = decline_request(&store, bob.id, req.id).await.unwrap().unwrap();
        assert_eq!(declined.status, FriendRequestStatus::Declined);
        assert!(store.all_friendships().is_empty());

        // no transition out of a terminal state
        assert!(cancel_request(&store, alice.id, req.id).await.unwrap().is_none());
        assert_eq!(store.request(req.id).unwrap().status, FriendRequestStatus::Declined);

        // re-requesting after a decline makes a new row
        let again = send_request(&store, alice.id, bob.id).await.unwrap();
        assert_ne!(again.id, req.id);
        let cancelled = cancel_request(&store, alice.id, again.id).await.unwrap().unwrap();
        assert_eq!(cancelled.status, FriendRequestStatus::Cancelled);
    }

    #[tokio::test]
    async fn friends_cannot_request_each_other_again() {
        let store = MemoryStore::new();
        let (alice, bob) = (user(&store, "alice").await, user(&store, "bob").await);
        befriend(&store, &alice, &bob).await;

        let err = send_request(&store, bob.id, alice.id).await.unwrap_err();
        assert!(matches!(err, FriendError::AlreadyFriends));
    }

    #[tokio::test]
    async fn friend_list_scans_both_columns_and_defaults_missing_stats() {
        let store = MemoryStore::new();
        let me = user(&store, "me").await;
        let ann = user(&store, "ann").await;
        let ben = user(&store, "ben").await;
        let stranger = user(&store, "zed").await;

        befriend(&store, &me, &ann).await; // me is friend_id
        befriend(&store, &ben, &me).await; // me is user_id
        befriend(&store, &ann, &stranger).await;

        store.upsert_stats(ann.id, TODAY, &metrics(72)).await.unwrap();
        store.set_streaks(ann.id, TODAY, 4);
        store
            .upsert_stats(ben.id, date!(2024-05-09), &metrics(90))
            .await
            .unwrap();

        let friends = list_friends(&store, me.id, TODAY).await.unwrap();
        let names: Vec<&str> = friends.iter().map(|f| f.profile.name.as_str()).collect();
        assert_eq!(names, vec!["ann", "ben"]);

        assert_eq!(friends[0].daily_score, 72);
        assert_eq!(friends[0].streaks.fasting, 4);
        // yesterday's row does not count for today
        assert_eq!(friends[1].daily_score, 0);
        assert_eq!(friends[1].streaks, Streaks::default());
    }

    #[tokio::test]
    async fn no_friends_is_an_empty_list() {
        let store = MemoryStore::new();
        let me = user(&store, "me").await;
        assert!(list_friends(&store, me.id, TODAY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn friend_profile_requires_friendship() {
        let store = MemoryStore::new();
        let (me, other) = (user(&store, "me").await, user(&store, "other").await);
        let err = friend_profile(&store, me.id, other.id, TODAY).await.unwrap_err();
        assert!(matches!(err, FriendError::NotFriends));
    }

    #[tokio::test]
    async fn friend_profile_applies_privacy_and_week_history() {
        let store = MemoryStore::new();
        let (me, pal) = (user(&store, "me").await, user(&store, "pal").await);
        befriend(&store, &me, &pal).await;

        store.upsert_stats(pal.id, TODAY, &metrics(81)).await.unwrap();
        store.upsert_stats(pal.id, date!(2024-05-05), &metrics(40)).await.unwrap();
        store.upsert_stats(pal.id, date!(2024-05-03), &metrics(55)).await.unwrap();
        store.upsert_stats(pal.id, date!(2024-05-01), &metrics(99)).await.unwrap();

        let view = friend_profile(&store, me.id, pal.id, TODAY).await.unwrap();
        assert_eq!(view.daily_score, 81);
        assert_eq!(view.message, "Great progress!");
        assert!(view.share_exact_numbers);
        assert_eq!(view.metrics[2].value, "1250ml");
        let dates: Vec<i32> = view.history.iter().map(|h| h.daily_score).collect();
        assert_eq!(dates, vec![55, 40, 81]);

        store
            .update_profile(
                pal.id,
                &ProfileChanges {
                    privacy_share_exact_numbers: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let view = friend_profile(&store, me.id, pal.id, TODAY).await.unwrap();
        assert!(!view.share_exact_numbers);
        assert_eq!(view.metrics[2].value, "50%");
        assert_eq!(view.metrics[2].target, "100%");
    }
}
