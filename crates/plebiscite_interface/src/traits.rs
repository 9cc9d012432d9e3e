//! Trait definitions for storage and chat platform backends.

use crate::{
    AnnouncementMessage, ChannelId, CosmeticRole, GuildId, GuildSettings, MemberInfo, MessageId,
    RoleId, RoleInfo, UserCooldown, UserId, Vote, VoteKind, Voter,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plebiscite_error::PlebisciteResult;

/// Durable storage for guild settings, the cosmetic-role allowlist, cooldowns
/// and votes.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Settings row of a guild, if one was ever written.
    async fn guild_settings(&self, guild_id: GuildId) -> PlebisciteResult<Option<GuildSettings>>;

    /// Upsert the announcement channel of a guild.
    async fn set_vote_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<()>;

    /// Whether `role_id` is on the guild's allowlist.
    async fn is_cosmetic_role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<bool>;

    /// All allowlisted role ids of a guild.
    async fn cosmetic_role_ids(&self, guild_id: GuildId) -> PlebisciteResult<Vec<RoleId>>;

    /// Insert an allowlist entry. Returns `false` if it already existed.
    async fn add_cosmetic_role(&self, role: CosmeticRole) -> PlebisciteResult<bool>;

    /// Delete an allowlist entry. Returns `false` if there was none.
    async fn remove_cosmetic_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> PlebisciteResult<bool>;

    /// Cooldown row of a user within a guild.
    async fn user_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> PlebisciteResult<Option<UserCooldown>>;

    /// Upsert `last_request_at = at` for a user within a guild.
    async fn touch_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        at: DateTime<Utc>,
    ) -> PlebisciteResult<()>;

    /// Persist a freshly announced vote.
    async fn insert_vote(&self, vote: &Vote) -> PlebisciteResult<()>;

    /// Every vote of `kind` that has not ended, oldest first.
    async fn open_votes(&self, kind: VoteKind) -> PlebisciteResult<Vec<Vote>>;

    /// Atomically mark a vote ended.
    ///
    /// Only a vote that has not ended yet is touched; the claimed row is
    /// returned (with `has_ended == true`). `None` means the vote was already
    /// claimed or never existed. Implementations must perform the check and the
    /// update as one step, never as a read followed by a write.
    async fn claim_vote(
        &self,
        kind: VoteKind,
        message_id: MessageId,
    ) -> PlebisciteResult<Option<Vote>>;
}

/// The chat platform operations the vote lifecycle needs.
///
/// Lookups return `Ok(None)` when the entity no longer exists; `Err` is kept
/// for genuine request failures.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Whether `channel_id` exists in `guild_id` and accepts messages.
    async fn is_sendable_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<bool>;

    /// Post a message and return its id.
    async fn send_message(&self, channel_id: ChannelId, content: &str)
    -> PlebisciteResult<MessageId>;

    /// React to a message with a unicode emoji.
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlebisciteResult<()>;

    /// Fetch a message by id.
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlebisciteResult<Option<AnnouncementMessage>>;

    /// Everyone who reacted to a message with `emoji`, bots included.
    async fn reaction_voters(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlebisciteResult<Vec<Voter>>;

    /// Replace a message's content.
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> PlebisciteResult<()>;

    /// Fetch a guild member.
    async fn member(&self, guild_id: GuildId, user_id: UserId)
    -> PlebisciteResult<Option<MemberInfo>>;

    /// Fetch a guild role.
    async fn role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<Option<RoleInfo>>;

    /// Set a member's guild display name.
    async fn set_nickname(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        nickname: &str,
    ) -> PlebisciteResult<()>;

    /// Give a member a role.
    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PlebisciteResult<()>;

    /// Take a role away from a member.
    async fn remove_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PlebisciteResult<()>;
}
