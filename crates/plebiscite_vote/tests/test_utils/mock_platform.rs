//! Recording chat platform for testing.

use async_trait::async_trait;
use plebiscite_error::{PlatformError, PlatformErrorKind, PlebisciteResult};
use plebiscite_interface::{
    AnnouncementMessage, ChannelId, ChatPlatform, GuildId, MemberInfo, MessageId, RoleId,
    RoleInfo, UserId, Voter,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Id the mock uses for its own reactions.
pub const BOT_USER: UserId = UserId(1);

#[derive(Default)]
struct MockState {
    channels: HashSet<(GuildId, ChannelId)>,
    messages: HashMap<MessageId, AnnouncementMessage>,
    reactions: HashMap<(MessageId, String), Vec<Voter>>,
    bot_reactions: Vec<(MessageId, String)>,
    members: HashMap<(GuildId, UserId), MemberInfo>,
    roles: HashMap<(GuildId, RoleId), RoleInfo>,
    nicknames: HashMap<(GuildId, UserId), String>,
    sent: Vec<(ChannelId, String)>,
    role_changes: usize,
    fail_edits: bool,
    next_message_id: u64,
}

/// In-memory guild that records every call the vote service makes.
///
/// The mock reacts as a bot when asked to add a reaction, so tallies have to
/// filter it out just like on the real platform.
pub struct MockChatPlatform {
    state: Mutex<MockState>,
}

#[allow(dead_code)]
impl MockChatPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_message_id: 9_000,
                ..MockState::default()
            }),
        }
    }

    pub fn add_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.state.lock().unwrap().channels.insert((guild_id, channel_id));
    }

    pub fn remove_channel(&self, guild_id: GuildId, channel_id: ChannelId) {
        self.state.lock().unwrap().channels.remove(&(guild_id, channel_id));
    }

    pub fn add_member(&self, guild_id: GuildId, user_id: UserId, manageable: bool) {
        self.state.lock().unwrap().members.insert(
            (guild_id, user_id),
            MemberInfo {
                user_id,
                role_ids: Vec::new(),
                manageable,
            },
        );
    }

    pub fn add_role(&self, guild_id: GuildId, role_id: RoleId, editable: bool) {
        self.state
            .lock()
            .unwrap()
            .roles
            .insert((guild_id, role_id), RoleInfo { role_id, editable });
    }

    /// Add a human reaction.
    pub fn react(&self, message_id: MessageId, emoji: &str, user_id: UserId) {
        self.state
            .lock()
            .unwrap()
            .reactions
            .entry((message_id, emoji.to_string()))
            .or_default()
            .push(Voter {
                user_id,
                bot: false,
            });
    }

    pub fn delete_message(&self, message_id: MessageId) {
        self.state.lock().unwrap().messages.remove(&message_id);
    }

    pub fn set_fail_edits(&self, fail: bool) {
        self.state.lock().unwrap().fail_edits = fail;
    }

    pub fn message_content(&self, message_id: MessageId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(&message_id)
            .map(|message| message.content.clone())
    }

    /// Emoji the bot attached to `message_id`, in call order.
    pub fn reaction_emoji(&self, message_id: MessageId) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .bot_reactions
            .iter()
            .filter(|(id, _)| *id == message_id)
            .map(|(_, emoji)| emoji.clone())
            .collect()
    }

    pub fn nickname(&self, guild_id: GuildId, user_id: UserId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .nicknames
            .get(&(guild_id, user_id))
            .cloned()
    }

    pub fn member_roles(&self, guild_id: GuildId, user_id: UserId) -> Vec<RoleId> {
        self.state
            .lock()
            .unwrap()
            .members
            .get(&(guild_id, user_id))
            .map(|member| member.role_ids.clone())
            .unwrap_or_default()
    }

    pub fn give_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) {
        if let Some(member) = self.state.lock().unwrap().members.get_mut(&(guild_id, user_id)) {
            member.role_ids.push(role_id);
        }
    }

    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn role_changes(&self) -> usize {
        self.state.lock().unwrap().role_changes
    }
}

#[async_trait]
impl ChatPlatform for MockChatPlatform {
    async fn is_sendable_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .channels
            .contains(&(guild_id, channel_id)))
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> PlebisciteResult<MessageId> {
        let mut state = self.state.lock().unwrap();
        state.next_message_id += 1;
        let message_id = MessageId(state.next_message_id);
        state.messages.insert(
            message_id,
            AnnouncementMessage {
                channel_id,
                message_id,
                content: content.to_string(),
            },
        );
        state.sent.push((channel_id, content.to_string()));
        Ok(message_id)
    }

    async fn add_reaction(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlebisciteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.bot_reactions.push((message_id, emoji.to_string()));
        state
            .reactions
            .entry((message_id, emoji.to_string()))
            .or_default()
            .push(Voter {
                user_id: BOT_USER,
                bot: true,
            });
        Ok(())
    }

    async fn fetch_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlebisciteResult<Option<AnnouncementMessage>> {
        Ok(self.state.lock().unwrap().messages.get(&message_id).cloned())
    }

    async fn reaction_voters(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlebisciteResult<Vec<Voter>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reactions
            .get(&(message_id, emoji.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn edit_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> PlebisciteResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_edits {
            return Err(
                PlatformError::new(PlatformErrorKind::Request("mock edit failure".into())).into(),
            );
        }
        if let Some(message) = state.messages.get_mut(&message_id) {
            message.content = content.to_string();
        }
        Ok(())
    }

    async fn member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> PlebisciteResult<Option<MemberInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .members
            .get(&(guild_id, user_id))
            .cloned())
    }

    async fn role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<Option<RoleInfo>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .roles
            .get(&(guild_id, role_id))
            .copied())
    }

    async fn set_nickname(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        nickname: &str,
    ) -> PlebisciteResult<()> {
        self.state
            .lock()
            .unwrap()
            .nicknames
            .insert((guild_id, user_id), nickname.to_string());
        Ok(())
    }

    async fn add_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PlebisciteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.role_changes += 1;
        if let Some(member) = state.members.get_mut(&(guild_id, user_id)) {
            member.role_ids.push(role_id);
        }
        Ok(())
    }

    async fn remove_member_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> PlebisciteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.role_changes += 1;
        if let Some(member) = state.members.get_mut(&(guild_id, user_id)) {
            member.role_ids.retain(|id| *id != role_id);
        }
        Ok(())
    }
}
