//! Vote requests and their receipts.

use plebiscite_interface::{ChannelId, GuildId, MessageId, UserId, VotePayload};

/// What a caller asks [`VoteService::start_vote`](crate::VoteService::start_vote) to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    /// Guild the vote runs in.
    pub guild_id: GuildId,
    /// Member the change applies to.
    pub target_user_id: UserId,
    /// Who asked for it. `None` renders as an anonymous placeholder.
    pub requester_id: Option<UserId>,
    /// Requested change.
    pub change: VotePayload,
}

/// Reference to a freshly opened vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("https://discord.com/channels/{guild_id}/{channel_id}/{message_id}")]
pub struct VoteStarted {
    /// Guild id.
    pub guild_id: GuildId,
    /// Announcement channel.
    pub channel_id: ChannelId,
    /// Announcement message, which is also the vote id.
    pub message_id: MessageId,
}

impl VoteStarted {
    /// Jump link to the announcement.
    pub fn link(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_points_at_announcement() {
        let started = VoteStarted {
            guild_id: GuildId(1),
            channel_id: ChannelId(2),
            message_id: MessageId(3),
        };
        assert_eq!(started.link(), "https://discord.com/channels/1/2/3");
    }
}
