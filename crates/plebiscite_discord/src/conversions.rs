//! Conversions between Plebiscite ids and Serenity ids.
//!
//! Serenity ids are non-zero; platform snowflakes never are, so converting a
//! value that came from the platform cannot panic.

use plebiscite_interface::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::all as discord;

pub(crate) fn to_guild(id: GuildId) -> discord::GuildId {
    discord::GuildId::new(id.get())
}

pub(crate) fn to_channel(id: ChannelId) -> discord::ChannelId {
    discord::ChannelId::new(id.get())
}

pub(crate) fn to_message(id: MessageId) -> discord::MessageId {
    discord::MessageId::new(id.get())
}

pub(crate) fn to_user(id: UserId) -> discord::UserId {
    discord::UserId::new(id.get())
}

pub(crate) fn to_role(id: RoleId) -> discord::RoleId {
    discord::RoleId::new(id.get())
}

pub(crate) fn from_user(id: discord::UserId) -> UserId {
    UserId(id.get())
}

pub(crate) fn from_message(id: discord::MessageId) -> MessageId {
    MessageId(id.get())
}

/// Whether a Serenity error is an HTTP 404 (unknown channel, message, member or role).
pub(crate) fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(serenity::http::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}
