//! Row structs for the vote tables and their conversions to domain types.
//!
//! Snowflakes are unsigned on the platform but stored as `BIGINT`; they always
//! fit in 63 bits, so the casts below are lossless.

use crate::schema::{cosmetic_roles, guild_settings, rename_votes, role_votes, user_cooldowns};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use plebiscite_interface::{
    ChannelId, CosmeticRole, GuildId, GuildSettings, MessageId, RoleId, UserCooldown, UserId,
    Vote, VotePayload,
};

/// Database row for `guild_settings`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = guild_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildSettingsRow {
    pub guild_id: i64,
    pub vote_channel_id: Option<i64>,
}

impl From<GuildSettingsRow> for GuildSettings {
    fn from(row: GuildSettingsRow) -> Self {
        Self {
            guild_id: GuildId(row.guild_id as u64),
            vote_channel_id: row.vote_channel_id.map(|id| ChannelId(id as u64)),
        }
    }
}

/// Database row for `cosmetic_roles`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cosmetic_roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CosmeticRoleRow {
    pub role_id: i64,
    pub guild_id: i64,
}

impl From<CosmeticRole> for CosmeticRoleRow {
    fn from(role: CosmeticRole) -> Self {
        Self {
            role_id: role.role_id.get() as i64,
            guild_id: role.guild_id.get() as i64,
        }
    }
}

/// Database row for `user_cooldowns`.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_cooldowns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserCooldownRow {
    pub user_id: i64,
    pub guild_id: i64,
    pub last_request_at: Option<DateTime<Utc>>,
}

impl From<UserCooldownRow> for UserCooldown {
    fn from(row: UserCooldownRow) -> Self {
        Self {
            user_id: UserId(row.user_id as u64),
            guild_id: GuildId(row.guild_id as u64),
            last_request_at: row.last_request_at,
        }
    }
}

/// Database row for `rename_votes`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = rename_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RenameVoteRow {
    pub message_id: i64,
    pub channel_id: i64,
    pub guild_id: i64,
    pub target_user_id: i64,
    pub new_name: String,
    pub started_at: DateTime<Utc>,
    pub has_ended: bool,
}

impl From<RenameVoteRow> for Vote {
    fn from(row: RenameVoteRow) -> Self {
        Self {
            message_id: MessageId(row.message_id as u64),
            channel_id: ChannelId(row.channel_id as u64),
            guild_id: GuildId(row.guild_id as u64),
            target_user_id: UserId(row.target_user_id as u64),
            started_at: row.started_at,
            has_ended: row.has_ended,
            payload: VotePayload::Rename {
                new_name: row.new_name,
            },
        }
    }
}

/// Database row for `role_votes`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = role_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoleVoteRow {
    pub message_id: i64,
    pub channel_id: i64,
    pub guild_id: i64,
    pub target_user_id: i64,
    pub role_id: i64,
    pub remove: bool,
    pub started_at: DateTime<Utc>,
    pub has_ended: bool,
}

impl From<RoleVoteRow> for Vote {
    fn from(row: RoleVoteRow) -> Self {
        Self {
            message_id: MessageId(row.message_id as u64),
            channel_id: ChannelId(row.channel_id as u64),
            guild_id: GuildId(row.guild_id as u64),
            target_user_id: UserId(row.target_user_id as u64),
            started_at: row.started_at,
            has_ended: row.has_ended,
            payload: VotePayload::Role {
                role_id: RoleId(row.role_id as u64),
                remove: row.remove,
            },
        }
    }
}

/// A vote split into the row of the table it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteRow {
    Rename(RenameVoteRow),
    Role(RoleVoteRow),
}

impl From<&Vote> for VoteRow {
    fn from(vote: &Vote) -> Self {
        let message_id = vote.message_id.get() as i64;
        let channel_id = vote.channel_id.get() as i64;
        let guild_id = vote.guild_id.get() as i64;
        let target_user_id = vote.target_user_id.get() as i64;
        match &vote.payload {
            VotePayload::Rename { new_name } => VoteRow::Rename(RenameVoteRow {
                message_id,
                channel_id,
                guild_id,
                target_user_id,
                new_name: new_name.clone(),
                started_at: vote.started_at,
                has_ended: vote.has_ended,
            }),
            VotePayload::Role { role_id, remove } => VoteRow::Role(RoleVoteRow {
                message_id,
                channel_id,
                guild_id,
                target_user_id,
                role_id: role_id.get() as i64,
                remove: *remove,
                started_at: vote.started_at,
                has_ended: vote.has_ended,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn role_vote() -> Vote {
        Vote {
            message_id: MessageId(1_234_567_890_123_456_789),
            channel_id: ChannelId(20),
            guild_id: GuildId(10),
            target_user_id: UserId(30),
            started_at: Utc.with_ymd_and_hms(2025, 1, 12, 9, 0, 0).unwrap(),
            has_ended: false,
            payload: VotePayload::Role {
                role_id: RoleId(40),
                remove: true,
            },
        }
    }

    #[test]
    fn role_vote_splits_into_role_row() {
        let vote = role_vote();
        let VoteRow::Role(row) = VoteRow::from(&vote) else {
            panic!("expected a role row");
        };
        assert_eq!(row.message_id, 1_234_567_890_123_456_789);
        assert_eq!(row.role_id, 40);
        assert!(row.remove);
        assert_eq!(Vote::from(row), vote);
    }

    #[test]
    fn rename_row_keeps_name_and_flag() {
        let row = RenameVoteRow {
            message_id: 1,
            channel_id: 2,
            guild_id: 3,
            target_user_id: 4,
            new_name: "Bob".to_string(),
            started_at: Utc.with_ymd_and_hms(2025, 1, 12, 9, 0, 0).unwrap(),
            has_ended: true,
        };
        let vote = Vote::from(row);
        assert!(vote.has_ended);
        assert_eq!(
            vote.payload,
            VotePayload::Rename {
                new_name: "Bob".to_string()
            }
        );
    }

    #[test]
    fn missing_channel_stays_missing() {
        let settings = GuildSettings::from(GuildSettingsRow {
            guild_id: 7,
            vote_channel_id: None,
        });
        assert_eq!(settings.vote_channel_id, None);
    }
}
