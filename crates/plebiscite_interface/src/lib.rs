//! Domain types and trait seams for Plebiscite.
//!
//! The vote lifecycle engine talks to the outside world through two traits:
//! - [`VoteStore`] for durable state (settings, allowlist, cooldowns, votes)
//! - [`ChatPlatform`] for messages, reactions, members and roles
//!
//! Production implementations live in `plebiscite_database` and
//! `plebiscite_discord`; tests plug in in-memory doubles.

mod traits;
mod types;

pub use traits::{ChatPlatform, VoteStore};
pub use types::{
    AnnouncementMessage, ChannelId, CosmeticRole, GuildId, GuildSettings, MemberInfo, MessageId,
    RoleId, RoleInfo, UserCooldown, UserId, Vote, VoteKind, VotePayload, Voter,
};
