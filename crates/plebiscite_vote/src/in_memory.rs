//! In-memory implementation of [`VoteStore`] for tests and local runs.
//!
//! Mirrors the PostgreSQL store's semantics, including the conditional claim,
//! which happens under a single write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plebiscite_error::PlebisciteResult;
use plebiscite_interface::{
    ChannelId, CosmeticRole, GuildId, GuildSettings, MessageId, RoleId, UserCooldown, UserId,
    Vote, VoteKind, VoteStore,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    guild_settings: HashMap<GuildId, GuildSettings>,
    cosmetic_roles: HashMap<RoleId, CosmeticRole>,
    user_cooldowns: HashMap<(UserId, GuildId), UserCooldown>,
    votes: HashMap<MessageId, Vote>,
}

/// HashMap-backed vote store. All data is lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVoteStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryVoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a vote regardless of its state (for testing).
    pub async fn vote(&self, message_id: MessageId) -> Option<Vote> {
        self.tables.read().await.votes.get(&message_id).cloned()
    }

    /// Number of stored votes, ended or not (for testing).
    pub async fn vote_count(&self) -> usize {
        self.tables.read().await.votes.len()
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn guild_settings(&self, guild_id: GuildId) -> PlebisciteResult<Option<GuildSettings>> {
        Ok(self.tables.read().await.guild_settings.get(&guild_id).cloned())
    }

    async fn set_vote_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<()> {
        self.tables
            .write()
            .await
            .guild_settings
            .entry(guild_id)
            .or_insert_with(|| GuildSettings {
                guild_id,
                vote_channel_id: None,
            })
            .vote_channel_id = Some(channel_id);
        Ok(())
    }

    async fn is_cosmetic_role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .cosmetic_roles
            .get(&role_id)
            .is_some_and(|role| role.guild_id == guild_id))
    }

    async fn cosmetic_role_ids(&self, guild_id: GuildId) -> PlebisciteResult<Vec<RoleId>> {
        let tables = self.tables.read().await;
        let mut ids: Vec<RoleId> = tables
            .cosmetic_roles
            .values()
            .filter(|role| role.guild_id == guild_id)
            .map(|role| role.role_id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn add_cosmetic_role(&self, role: CosmeticRole) -> PlebisciteResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.cosmetic_roles.contains_key(&role.role_id) {
            return Ok(false);
        }
        tables.cosmetic_roles.insert(role.role_id, role);
        Ok(true)
    }

    async fn remove_cosmetic_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> PlebisciteResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.cosmetic_roles.get(&role_id) {
            Some(role) if role.guild_id == guild_id => {
                tables.cosmetic_roles.remove(&role_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn user_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> PlebisciteResult<Option<UserCooldown>> {
        Ok(self
            .tables
            .read()
            .await
            .user_cooldowns
            .get(&(user_id, guild_id))
            .cloned())
    }

    async fn touch_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        at: DateTime<Utc>,
    ) -> PlebisciteResult<()> {
        self.tables.write().await.user_cooldowns.insert(
            (user_id, guild_id),
            UserCooldown {
                user_id,
                guild_id,
                last_request_at: Some(at),
            },
        );
        Ok(())
    }

    async fn insert_vote(&self, vote: &Vote) -> PlebisciteResult<()> {
        self.tables
            .write()
            .await
            .votes
            .insert(vote.message_id, vote.clone());
        Ok(())
    }

    async fn open_votes(&self, kind: VoteKind) -> PlebisciteResult<Vec<Vote>> {
        let tables = self.tables.read().await;
        let mut votes: Vec<Vote> = tables
            .votes
            .values()
            .filter(|vote| vote.kind() == kind && !vote.has_ended)
            .cloned()
            .collect();
        votes.sort_by_key(|vote| vote.started_at);
        Ok(votes)
    }

    async fn claim_vote(
        &self,
        kind: VoteKind,
        message_id: MessageId,
    ) -> PlebisciteResult<Option<Vote>> {
        let mut tables = self.tables.write().await;
        match tables.votes.get_mut(&message_id) {
            Some(vote) if vote.kind() == kind && !vote.has_ended => {
                vote.has_ended = true;
                Ok(Some(vote.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plebiscite_interface::VotePayload;

    fn rename_vote(id: u64, started_at: DateTime<Utc>) -> Vote {
        Vote {
            message_id: MessageId(id),
            channel_id: ChannelId(2),
            guild_id: GuildId(1),
            target_user_id: UserId(3),
            started_at,
            has_ended: false,
            payload: VotePayload::Rename {
                new_name: "Bob".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn claim_flips_once() {
        let store = InMemoryVoteStore::new();
        store.insert_vote(&rename_vote(10, Utc::now())).await.unwrap();

        let first = store.claim_vote(VoteKind::Rename, MessageId(10)).await.unwrap();
        assert!(first.is_some_and(|vote| vote.has_ended));
        let second = store.claim_vote(VoteKind::Rename, MessageId(10)).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn claim_ignores_other_kind() {
        let store = InMemoryVoteStore::new();
        store.insert_vote(&rename_vote(10, Utc::now())).await.unwrap();
        assert!(
            store
                .claim_vote(VoteKind::Role, MessageId(10))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn open_votes_oldest_first() {
        let store = InMemoryVoteStore::new();
        let now = Utc::now();
        store
            .insert_vote(&rename_vote(1, now))
            .await
            .unwrap();
        store
            .insert_vote(&rename_vote(2, now - chrono::Duration::minutes(1)))
            .await
            .unwrap();
        let ids: Vec<MessageId> = store
            .open_votes(VoteKind::Rename)
            .await
            .unwrap()
            .into_iter()
            .map(|vote| vote.message_id)
            .collect();
        assert_eq!(ids, vec![MessageId(2), MessageId(1)]);
    }

    #[tokio::test]
    async fn cosmetic_roles_are_scoped_by_guild() {
        let store = InMemoryVoteStore::new();
        let role = CosmeticRole {
            role_id: RoleId(5),
            guild_id: GuildId(1),
        };
        assert!(store.add_cosmetic_role(role).await.unwrap());
        assert!(!store.add_cosmetic_role(role).await.unwrap());
        assert!(store.is_cosmetic_role(GuildId(1), RoleId(5)).await.unwrap());
        assert!(!store.is_cosmetic_role(GuildId(2), RoleId(5)).await.unwrap());
        assert!(!store.remove_cosmetic_role(GuildId(2), RoleId(5)).await.unwrap());
        assert!(store.remove_cosmetic_role(GuildId(1), RoleId(5)).await.unwrap());
    }
}
