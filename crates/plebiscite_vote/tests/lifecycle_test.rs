//! Tests for timer-driven resolution, restart recovery and claim exclusivity.

mod test_utils;

use chrono::Utc;
use plebiscite_interface::{MessageId, Vote, VoteKind, VotePayload, VoteStore};
use plebiscite_vote::{InMemoryVoteStore, MutationOutcome, Outcome, Resolution};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{CHANNEL, GUILD, REQUESTER, ROLE, TARGET, configured, rename_request};

fn persisted_role_vote(message_id: u64, age: chrono::Duration) -> Vote {
    Vote {
        message_id: MessageId(message_id),
        channel_id: CHANNEL,
        guild_id: GUILD,
        target_user_id: TARGET,
        started_at: Utc::now() - age,
        has_ended: false,
        payload: VotePayload::Role {
            role_id: ROLE,
            remove: false,
        },
    }
}

#[tokio::test(start_paused = true)]
async fn test_vote_resolves_when_timer_expires() {
    let f = configured().await;
    let started = f
        .service
        .request_vote(REQUESTER, rename_request("Bob"))
        .await
        .unwrap();
    for user in 10..13 {
        f.platform
            .react(started.message_id, "👍", plebiscite_interface::UserId(user));
    }

    tokio::time::sleep(Duration::from_secs(299)).await;
    assert!(!f.store.vote(started.message_id).await.unwrap().has_ended);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(f.store.vote(started.message_id).await.unwrap().has_ended);
    assert_eq!(f.platform.nickname(GUILD, TARGET).as_deref(), Some("Bob"));
    assert!(f.service.scheduler().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_overdue_vote_resolved_immediately_on_init() {
    let f = configured().await;
    f.service.add_cosmetic_role(GUILD, ROLE).await.unwrap();
    let expiration = f.service.config().expiration();
    let vote = persisted_role_vote(77, expiration + chrono::Duration::minutes(1));
    f.store.insert_vote(&vote).await.unwrap();

    assert_eq!(f.service.init().await.unwrap(), 1);
    assert!(!f.service.scheduler().is_scheduled(vote.message_id));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(f.store.vote(vote.message_id).await.unwrap().has_ended);
}

#[tokio::test(start_paused = true)]
async fn test_pending_vote_rescheduled_on_init() {
    let f = configured().await;
    let vote = persisted_role_vote(78, chrono::Duration::minutes(1));
    f.store.insert_vote(&vote).await.unwrap();

    f.service.init().await.unwrap();
    assert!(f.service.scheduler().is_scheduled(vote.message_id));

    tokio::time::sleep(Duration::from_secs(3 * 60)).await;
    assert!(!f.store.vote(vote.message_id).await.unwrap().has_ended);

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert!(f.store.vote(vote.message_id).await.unwrap().has_ended);
    assert!(f.service.scheduler().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_votes_open_for_next_process() {
    let f = configured().await;
    let started = f.service.start_vote(rename_request("Bob")).await.unwrap();

    assert_eq!(f.service.shutdown(), 1);
    tokio::time::sleep(Duration::from_secs(600)).await;

    let open = f.store.open_votes(VoteKind::Rename).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].message_id, started.message_id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_yield_one_row() {
    let store = Arc::new(InMemoryVoteStore::new());
    store
        .insert_vote(&persisted_role_vote(5, chrono::Duration::zero()))
        .await
        .unwrap();

    let claims: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.claim_vote(VoteKind::Role, MessageId(5)).await })
        })
        .collect();

    let mut winners = 0;
    for claim in claims {
        if claim.await.unwrap().unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolves_decide_once() {
    let f = configured().await;
    let started = f.service.start_vote(rename_request("Bob")).await.unwrap();
    for user in 10..13 {
        f.platform
            .react(started.message_id, "👍", plebiscite_interface::UserId(user));
    }

    let resolves: Vec<_> = (0..6)
        .map(|_| {
            let service = f.service.clone();
            let message_id = started.message_id;
            tokio::spawn(async move { service.resolve(VoteKind::Rename, message_id).await })
        })
        .collect();

    let mut decided = 0;
    let mut already_ended = 0;
    for resolve in resolves {
        match resolve.await.unwrap().unwrap() {
            Resolution::Decided {
                outcome, mutation, ..
            } => {
                assert_eq!(outcome, Outcome::Accepted);
                assert_eq!(mutation, Some(MutationOutcome::Applied));
                decided += 1;
            }
            Resolution::AlreadyEnded => already_ended += 1,
            other => panic!("unexpected resolution {other:?}"),
        }
    }
    assert_eq!(decided, 1);
    assert_eq!(already_ended, 5);
    assert_eq!(f.platform.nickname(GUILD, TARGET).as_deref(), Some("Bob"));
    assert!(f.service.scheduler().is_empty());
}
