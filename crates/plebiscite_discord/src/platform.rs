//! Serenity-backed [`ChatPlatform`].

use crate::conversions::{
    from_message, from_user, is_not_found, to_channel, to_guild, to_message, to_role, to_user,
};
use async_trait::async_trait;
use plebiscite_error::{PlatformError, PlebisciteResult};
use plebiscite_interface::{
    AnnouncementMessage, ChannelId, ChatPlatform, GuildId, MemberInfo, MessageId, RoleId,
    RoleInfo, UserId, Voter,
};
use serenity::all::{
    Channel, ChannelType, CreateAllowedMentions, CreateMessage, EditMember, EditMessage, Http,
    PartialGuild, ReactionType,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Page size Discord allows for reaction user listings.
const REACTION_PAGE: u8 = 100;

/// Audit log reason attached to role changes.
const AUDIT_REASON: &str = "Plebiscite vote passed";

/// Discord through Serenity's HTTP client.
pub struct SerenityPlatform {
    http: Arc<Http>,
    bot_user: OnceCell<serenity::all::UserId>,
}

impl SerenityPlatform {
    /// Create a platform over an HTTP client.
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            bot_user: OnceCell::new(),
        }
    }

    /// Shared HTTP client.
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    async fn bot_user_id(&self) -> PlebisciteResult<serenity::all::UserId> {
        let id = self
            .bot_user
            .get_or_try_init(|| async { self.http.get_current_user().await.map(|user| user.id) })
            .await
            .map_err(PlatformError::from)?;
        Ok(*id)
    }

    /// Highest role position the bot holds in `guild`, or `None` when it owns
    /// the guild and so outranks everyone.
    async fn bot_rank(&self, guild_id: GuildId, guild: &PartialGuild) -> PlebisciteResult<Option<u16>> {
        let bot_id = self.bot_user_id().await?;
        if bot_id == guild.owner_id {
            return Ok(None);
        }
        let bot = to_guild(guild_id)
            .member(self.http.as_ref(), bot_id)
            .await
            .map_err(PlatformError::from)?;
        Ok(Some(highest_position(guild, &bot.roles)))
    }
}

fn highest_position(guild: &PartialGuild, roles: &[serenity::all::RoleId]) -> u16 {
    roles
        .iter()
        .filter_map(|id| guild.roles.get(id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

fn is_message_capable(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::Text
            | ChannelType::News
            | ChannelType::Voice
            | ChannelType::Stage
            | ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::NewsThread
    )
}

#[async_trait]
impl ChatPlatform for SerenityPlatform {
    #[instrument(skip(self))]
    async fn is_sendable_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<bool> {
        match to_channel(channel_id).to_channel(self.http.as_ref()).await {
            Ok(Channel::Guild(channel)) => {
                Ok(channel.guild_id == to_guild(guild_id) && is_message_capable(channel.kind))
            }
            Ok(_) => Ok(false),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(PlatformError::from(e).into()),
        }
    }

    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> PlebisciteResult<MessageId> {
        let builder = CreateMessage::new()
            .content(content)
            .allowed_mentions(CreateAllowedMentions::new());
        let message = to_channel(channel_id)
            .send_message(self.http.as_ref(), builder)
            .await
            .map_err(PlatformError::from)?;
        debug!(message_id = %message.id, "Message sent");
        Ok(from_message(message.id))
    }

    #[instrument(skip(self))]
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlebisciteResult<()> {
        to_channel(channel_id)
            .create_reaction(
                self.http.as_ref(),
                to_message(message_id),
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(PlatformError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlebisciteResult<Option<AnnouncementMessage>> {
        match to_channel(channel_id)
            .message(self.http.as_ref(), to_message(message_id))
            .await
        {
            Ok(message) => Ok(Some(AnnouncementMessage {
                channel_id,
                message_id,
                content: message.content,
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(PlatformError::from(e).into()),
        }
    }

    #[instrument(skip(self))]
    async fn reaction_voters(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlebisciteResult<Vec<Voter>> {
        let channel = to_channel(channel_id);
        let message = to_message(message_id);
        let mut voters = Vec::new();
        let mut after = None;
        loop {
            let page = channel
                .reaction_users(
                    self.http.as_ref(),
                    message,
                    ReactionType::Unicode(emoji.to_string()),
                    Some(REACTION_PAGE),
                    after,
                )
                .await
                .map_err(PlatformError::from)?;
            let last_page = page.len() < usize::from(REACTION_PAGE);
            after = page.last().map(|user| user.id);
            voters.extend(page.into_iter().map(|user| Voter {
                user_id: from_user(user.id),
                bot: user.bot,
            }));
            if last_page || after.is_none() {
                break;
            }
        }
        debug!(count = voters.len(), "Fetched reaction users");
        Ok(voters)
    }

    #[instrument(skip(self, content))]
    async fn edit_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> PlebisciteResult<()> {
        to_channel(channel_id)
            .edit_message(
                self.http.as_ref(),
                to_message(message_id),
                EditMessage::new()
                    .content(content)
                    .allowed_mentions(CreateAllowedMentions::new()),
            )
            .await
            .map_err(PlatformError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> PlebisciteResult<Option<MemberInfo>> {
        let guild = to_guild(guild_id);
        let member = match guild.member(self.http.as_ref(), to_user(user_id)).await {
            Ok(member) => member,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(PlatformError::from(e).into()),
        };

        let partial = guild
            .to_partial_guild(self.http.as_ref())
            .await
            .map_err(PlatformError::from)?;
        let manageable = if member.user.id == partial.owner_id
            || member.user.id == self.bot_user_id().await?
        {
            false
        } else {
            match self.bot_rank(guild_id, &partial).await? {
                None => true,
                Some(rank) => rank > highest_position(&partial, &member.roles),
            }
        };

        Ok(Some(MemberInfo {
            user_id,
            role_ids: member.roles.iter().map(|id| RoleId(id.get())).collect(),
            manageable,
        }))
    }

    #[instrument(skip(self))]
    async fn role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<Option<RoleInfo>> {
        let partial = to_guild(guild_id)
            .to_partial_guild(self.http.as_ref())
            .await
            .map_err(PlatformError::from)?;
        let Some(role) = partial.roles.get(&to_role(role_id)) else {
            return Ok(None);
        };
        let editable = !role.managed
            && match self.bot_rank(guild_id, &partial).await? {
                None => true,
                Some(rank) => rank > role.position,
            };
        Ok(Some(RoleInfo { role_id, editable }))
    }

    #[instrument(skip(self))]
    async fn set_nickname(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        nickname: &str,
    ) -> PlebisciteResult<()> {
        to_guild(guild_id)
            .edit_member(
                self.http.as_ref(),
                to_user(user_id),
                EditMember::new().nickname(nickname),
            )
            .await
            .map_err(PlatformError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PlebisciteResult<()> {
        self.http
            .add_member_role(
                to_guild(guild_id),
                to_user(user_id),
                to_role(role_id),
                Some(AUDIT_REASON),
            )
            .await
            .map_err(PlatformError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PlebisciteResult<()> {
        self.http
            .remove_member_role(
                to_guild(guild_id),
                to_user(user_id),
                to_role(role_id),
                Some(AUDIT_REASON),
            )
            .await
            .map_err(PlatformError::from)?;
        Ok(())
    }
}
