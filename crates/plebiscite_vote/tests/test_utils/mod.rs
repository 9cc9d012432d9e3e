//! Test utilities for vote lifecycle tests.
//!
//! This module provides a mock chat platform and a ready-made service fixture.

pub mod mock_platform;

#[allow(unused_imports)]
pub use mock_platform::{BOT_USER, MockChatPlatform};

use plebiscite_error::{PlebisciteError, PlebisciteErrorKind, VoteErrorKind};
use plebiscite_interface::{ChannelId, GuildId, RoleId, UserId, VotePayload};
use plebiscite_vote::{InMemoryVoteStore, VoteConfig, VoteRequest, VoteService};
use std::sync::Arc;

#[allow(dead_code)]
pub const GUILD: GuildId = GuildId(100);
#[allow(dead_code)]
pub const CHANNEL: ChannelId = ChannelId(200);
#[allow(dead_code)]
pub const REQUESTER: UserId = UserId(300);
#[allow(dead_code)]
pub const TARGET: UserId = UserId(301);
#[allow(dead_code)]
pub const ROLE: RoleId = RoleId(400);

pub type TestService = VoteService<InMemoryVoteStore, MockChatPlatform>;

/// Service, store and platform sharing one guild with a requester and a target.
#[allow(dead_code)]
pub struct Fixture {
    pub service: TestService,
    pub store: Arc<InMemoryVoteStore>,
    pub platform: Arc<MockChatPlatform>,
}

/// Fixture with the announcement channel configured.
#[allow(dead_code)]
pub async fn configured() -> Fixture {
    let fixture = unconfigured();
    fixture
        .service
        .set_vote_channel(GUILD, CHANNEL)
        .await
        .expect("channel is sendable");
    fixture
}

/// Fixture whose guild has no announcement channel yet.
#[allow(dead_code)]
pub fn unconfigured() -> Fixture {
    unconfigured_with(VoteConfig::default())
}

/// Fixture with custom vote settings and no announcement channel.
#[allow(dead_code)]
pub fn unconfigured_with(config: VoteConfig) -> Fixture {
    let store = Arc::new(InMemoryVoteStore::new());
    let platform = Arc::new(MockChatPlatform::new());
    platform.add_channel(GUILD, CHANNEL);
    platform.add_member(GUILD, REQUESTER, true);
    platform.add_member(GUILD, TARGET, true);
    let service = VoteService::new(
        Arc::clone(&store),
        Arc::clone(&platform),
        config,
    );
    Fixture {
        service,
        store,
        platform,
    }
}

#[allow(dead_code)]
pub fn rename_request(name: &str) -> VoteRequest {
    VoteRequest {
        guild_id: GUILD,
        target_user_id: TARGET,
        requester_id: None,
        change: VotePayload::Rename {
            new_name: name.to_string(),
        },
    }
}

#[allow(dead_code)]
pub fn role_request(role_id: RoleId, remove: bool) -> VoteRequest {
    VoteRequest {
        guild_id: GUILD,
        target_user_id: TARGET,
        requester_id: None,
        change: VotePayload::Role { role_id, remove },
    }
}

/// Kind of a user-correctable error, `None` for internal ones.
#[allow(dead_code)]
pub fn vote_error_kind(err: &PlebisciteError) -> Option<&VoteErrorKind> {
    match err.kind() {
        PlebisciteErrorKind::Vote(e) => Some(&e.kind),
        _ => None,
    }
}
