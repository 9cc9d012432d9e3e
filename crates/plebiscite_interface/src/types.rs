//! Core type definitions for the Plebiscite interface.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[display("{}", _0)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }
    };
}

snowflake!(
    /// Guild (server) identifier.
    GuildId
);
snowflake!(
    /// Channel identifier.
    ChannelId
);
snowflake!(
    /// Message identifier. Also the primary key of a vote.
    MessageId
);
snowflake!(
    /// User identifier.
    UserId
);
snowflake!(
    /// Role identifier.
    RoleId
);

/// Which table a vote lives in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// Change a member's display name.
    #[display("rename")]
    Rename,
    /// Grant or revoke a cosmetic role.
    #[display("role")]
    Role,
}

/// Variant-specific part of a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotePayload {
    /// Rename the target to `new_name`.
    Rename {
        /// Requested display name.
        new_name: String,
    },
    /// Grant (`remove == false`) or revoke (`remove == true`) `role_id`.
    Role {
        /// Cosmetic role to change.
        role_id: RoleId,
        /// Revoke instead of grant.
        remove: bool,
    },
}

impl VotePayload {
    /// Kind discriminant of this payload.
    pub fn kind(&self) -> VoteKind {
        match self {
            VotePayload::Rename { .. } => VoteKind::Rename,
            VotePayload::Role { .. } => VoteKind::Role,
        }
    }
}

/// A persisted vote: the shared envelope plus its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Announcement message id (primary key).
    pub message_id: MessageId,
    /// Channel holding the announcement.
    pub channel_id: ChannelId,
    /// Guild the vote belongs to.
    pub guild_id: GuildId,
    /// Member the outcome applies to.
    pub target_user_id: UserId,
    /// When the announcement was posted.
    pub started_at: DateTime<Utc>,
    /// Whether resolution has claimed this vote.
    pub has_ended: bool,
    /// Rename or role specifics.
    pub payload: VotePayload,
}

impl Vote {
    /// Kind discriminant of this vote.
    pub fn kind(&self) -> VoteKind {
        self.payload.kind()
    }

    /// Absolute time at which the vote expires.
    pub fn deadline(&self, expiration: Duration) -> DateTime<Utc> {
        self.started_at + expiration
    }
}

/// Per-guild settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    /// Guild id.
    pub guild_id: GuildId,
    /// Announcement channel, if configured.
    pub vote_channel_id: Option<ChannelId>,
}

/// Allowlist entry for roles that may be voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CosmeticRole {
    /// Role id.
    pub role_id: RoleId,
    /// Guild owning the role.
    pub guild_id: GuildId,
}

/// Last vote request of a user within a guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCooldown {
    /// Requesting user.
    pub user_id: UserId,
    /// Guild scope.
    pub guild_id: GuildId,
    /// Last successful request, `None` when never requested.
    pub last_request_at: Option<DateTime<Utc>>,
}

/// Someone who reacted to an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Voter {
    /// Reacting user.
    pub user_id: UserId,
    /// Automated account flag.
    pub bot: bool,
}

/// Announcement message as currently stored by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementMessage {
    /// Channel id.
    pub channel_id: ChannelId,
    /// Message id.
    pub message_id: MessageId,
    /// Current text content.
    pub content: String,
}

/// Guild member as seen by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member's user id.
    pub user_id: UserId,
    /// Roles currently held.
    pub role_ids: Vec<RoleId>,
    /// Whether the bot outranks this member (can rename them).
    pub manageable: bool,
}

impl MemberInfo {
    /// Whether the member currently holds `role_id`.
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.role_ids.contains(&role_id)
    }
}

/// Guild role as seen by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleInfo {
    /// Role id.
    pub role_id: RoleId,
    /// Whether the bot may assign or remove this role.
    pub editable: bool,
}
