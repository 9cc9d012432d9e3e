//! The vote lifecycle: request, announce, persist, expire, tally, apply.

use crate::{
    ExpirationScheduler, Outcome, VoteConfig, VoteRequest, VoteStarted, announcement_text, decide,
    format_remaining, remaining_cooldown, result_text,
};
use chrono::{Duration, Utc};
use plebiscite_error::{PlebisciteResult, VoteError, VoteErrorKind};
use plebiscite_interface::{
    ChannelId, ChatPlatform, CosmeticRole, GuildId, MessageId, RoleId, UserId, Vote, VoteKind,
    VotePayload, VoteStore,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Longest display name the platform accepts.
pub const MAX_NAME_CHARS: usize = 32;

/// How a resolution attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Someone else already claimed the vote, or it never existed.
    AlreadyEnded,
    /// The announcement or its channel is gone; the vote is ended untallied.
    Orphaned,
    /// A platform or storage call failed after the claim. The vote stays ended.
    Interrupted,
    /// The vote was tallied and the result announced.
    Decided {
        /// Pass or fail.
        outcome: Outcome,
        /// Distinct human approvals.
        yes: usize,
        /// Distinct human rejections.
        no: usize,
        /// What the mutation step did; `None` when the vote failed.
        mutation: Option<MutationOutcome>,
    },
}

/// Result of applying an accepted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The rename or role change was performed.
    Applied,
    /// The member already has the requested role state.
    AlreadyInState,
    /// The bot ranks too low to rename the member or edit the role.
    NotPermitted,
    /// The role left the cosmetic allowlist while the vote was open.
    NoLongerAllowed,
    /// The target member left the guild.
    TargetMissing,
    /// The role was deleted.
    RoleMissing,
}

struct Shared<S, P> {
    store: Arc<S>,
    platform: Arc<P>,
    config: VoteConfig,
    scheduler: ExpirationScheduler,
}

/// Owns vote state transitions and the expiration timers.
///
/// Cheap to clone; clones share the store, platform and scheduler.
pub struct VoteService<S, P> {
    shared: Arc<Shared<S, P>>,
}

impl<S, P> Clone for VoteService<S, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, P> VoteService<S, P>
where
    S: VoteStore + 'static,
    P: ChatPlatform + 'static,
{
    /// Create a service with an empty scheduler. Call [`init`](Self::init)
    /// once the platform is ready to resume persisted votes.
    pub fn new(store: Arc<S>, platform: Arc<P>, config: VoteConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                platform,
                config,
                scheduler: ExpirationScheduler::new(),
            }),
        }
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.shared.store
    }

    /// Chat platform.
    pub fn platform(&self) -> &Arc<P> {
        &self.shared.platform
    }

    /// Active settings.
    pub fn config(&self) -> &VoteConfig {
        &self.shared.config
    }

    /// Pending expiration timers.
    pub fn scheduler(&self) -> &ExpirationScheduler {
        &self.shared.scheduler
    }

    /// Rebuild expiration timers from every vote that has not ended.
    ///
    /// Votes already past their deadline are resolved right away on a detached
    /// task; the rest are scheduled for their remaining time. Returns the number
    /// of votes picked up.
    #[instrument(skip(self))]
    pub async fn init(&self) -> PlebisciteResult<usize> {
        let expiration = self.shared.config.expiration();
        let mut resumed = 0;
        for kind in [VoteKind::Rename, VoteKind::Role] {
            let votes = self.shared.store.open_votes(kind).await?;
            let now = Utc::now();
            for vote in votes {
                let deadline = vote.deadline(expiration);
                if now >= deadline {
                    debug!(message_id = %vote.message_id, %kind, "Vote overdue, resolving now");
                    tokio::spawn(self.clone().resolve_logged(kind, vote.message_id));
                } else {
                    self.arm(kind, vote.message_id, deadline - now);
                }
                resumed += 1;
            }
        }
        info!(resumed, "Vote scheduler rebuilt");
        Ok(resumed)
    }

    /// Time left before `user_id` may request another vote in `guild_id`.
    #[instrument(skip(self))]
    pub async fn remaining_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> PlebisciteResult<Option<Duration>> {
        let last = self
            .shared
            .store
            .user_cooldown(user_id, guild_id)
            .await?
            .and_then(|cooldown| cooldown.last_request_at);
        Ok(remaining_cooldown(
            last,
            self.shared.config.cooldown(),
            Utc::now(),
        ))
    }

    /// Restart the cooldown of `user_id` in `guild_id` from now.
    #[instrument(skip(self))]
    pub async fn bump_cooldown(&self, user_id: UserId, guild_id: GuildId) -> PlebisciteResult<()> {
        self.shared
            .store
            .touch_cooldown(user_id, guild_id, Utc::now())
            .await
    }

    /// Whether `role_id` may be voted on in `guild_id`.
    pub async fn is_cosmetic_role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<bool> {
        self.shared.store.is_cosmetic_role(guild_id, role_id).await
    }

    /// Allowlisted roles of a guild.
    pub async fn cosmetic_role_ids(&self, guild_id: GuildId) -> PlebisciteResult<Vec<RoleId>> {
        self.shared.store.cosmetic_role_ids(guild_id).await
    }

    /// Put a role on the allowlist.
    ///
    /// # Errors
    ///
    /// [`VoteErrorKind::RoleAlreadyAllowed`] when it is already listed.
    #[instrument(skip(self))]
    pub async fn add_cosmetic_role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<()> {
        let role = CosmeticRole { role_id, guild_id };
        if !self.shared.store.add_cosmetic_role(role).await? {
            return Err(VoteError::new(VoteErrorKind::RoleAlreadyAllowed).into());
        }
        info!("Cosmetic role added");
        Ok(())
    }

    /// Take a role off the allowlist.
    ///
    /// # Errors
    ///
    /// [`VoteErrorKind::RoleNotListed`] when it was not listed.
    #[instrument(skip(self))]
    pub async fn remove_cosmetic_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> PlebisciteResult<()> {
        if !self.shared.store.remove_cosmetic_role(guild_id, role_id).await? {
            return Err(VoteError::new(VoteErrorKind::RoleNotListed).into());
        }
        info!("Cosmetic role removed");
        Ok(())
    }

    /// Point the guild's announcements at `channel_id`.
    ///
    /// # Errors
    ///
    /// [`VoteErrorKind::UnsendableChannel`] when the channel cannot take
    /// messages.
    #[instrument(skip(self))]
    pub async fn set_vote_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<()> {
        if !self
            .shared
            .platform
            .is_sendable_channel(guild_id, channel_id)
            .await?
        {
            return Err(VoteError::new(VoteErrorKind::UnsendableChannel).into());
        }
        self.shared.store.set_vote_channel(guild_id, channel_id).await?;
        info!("Vote channel configured");
        Ok(())
    }

    /// Command-facing entry point.
    ///
    /// Checks that the target is a member, rejects an active cooldown,
    /// pre-checks the name and the allowlist, then consumes the cooldown and
    /// opens the vote. An unusable announcement channel only surfaces inside
    /// [`start_vote`](Self::start_vote), after the cooldown was consumed.
    #[instrument(skip(self, request), fields(guild_id = %request.guild_id, target = %request.target_user_id))]
    pub async fn request_vote(
        &self,
        requester: UserId,
        mut request: VoteRequest,
    ) -> PlebisciteResult<VoteStarted> {
        let guild_id = request.guild_id;
        if self
            .shared
            .platform
            .member(guild_id, request.target_user_id)
            .await?
            .is_none()
        {
            return Err(VoteError::new(VoteErrorKind::TargetNotInGuild).into());
        }

        if let Some(remaining) = self.remaining_cooldown(requester, guild_id).await? {
            return Err(
                VoteError::new(VoteErrorKind::CooldownActive(format_remaining(remaining))).into(),
            );
        }

        validate_change(&request.change)?;
        if let VotePayload::Role { role_id, .. } = &request.change {
            self.ensure_cosmetic_role(guild_id, *role_id).await?;
        }

        self.bump_cooldown(requester, guild_id).await?;
        request.requester_id = Some(requester);
        self.start_vote(request).await
    }

    /// Validate, announce, persist and arm a vote.
    ///
    /// Nothing is sent or stored when validation fails.
    #[instrument(skip(self, request), fields(guild_id = %request.guild_id, target = %request.target_user_id))]
    pub async fn start_vote(&self, request: VoteRequest) -> PlebisciteResult<VoteStarted> {
        let VoteRequest {
            guild_id,
            target_user_id,
            requester_id,
            change,
        } = request;

        validate_change(&change)?;
        let channel_id = self.vote_channel(guild_id).await?;
        if let VotePayload::Role { role_id, .. } = &change {
            self.ensure_cosmetic_role(guild_id, *role_id).await?;
        }

        let platform = &self.shared.platform;
        let config = &self.shared.config;
        let content = announcement_text(requester_id, target_user_id, &change);
        let message_id = platform.send_message(channel_id, &content).await?;
        platform
            .add_reaction(channel_id, message_id, &config.yes_emoji)
            .await?;
        platform
            .add_reaction(channel_id, message_id, &config.no_emoji)
            .await?;

        let vote = Vote {
            message_id,
            channel_id,
            guild_id,
            target_user_id,
            started_at: Utc::now(),
            has_ended: false,
            payload: change,
        };
        self.shared.store.insert_vote(&vote).await?;
        self.arm(vote.kind(), message_id, config.expiration());

        info!(%message_id, kind = %vote.kind(), "Vote started");
        Ok(VoteStarted {
            guild_id,
            channel_id,
            message_id,
        })
    }

    /// Claim, tally, announce and apply a vote.
    ///
    /// Only the caller that wins the claim does any work. Failures after the
    /// claim are logged and reported as [`Resolution::Interrupted`]; they are
    /// never retried.
    #[instrument(skip(self))]
    pub async fn resolve(&self, kind: VoteKind, message_id: MessageId) -> PlebisciteResult<Resolution> {
        self.shared.scheduler.cancel(message_id);

        let Some(vote) = self.shared.store.claim_vote(kind, message_id).await? else {
            debug!("Vote already ended");
            return Ok(Resolution::AlreadyEnded);
        };

        match self.finish(&vote).await {
            Ok(resolution) => Ok(resolution),
            Err(e) => {
                error!(error = %e, "Vote resolution interrupted");
                Ok(Resolution::Interrupted)
            }
        }
    }

    /// Perform the change an accepted vote asks for.
    ///
    /// Re-checks everything against current platform state, so applying the
    /// same vote twice leaves the member as after the first application.
    #[instrument(skip(self, vote), fields(message_id = %vote.message_id, target = %vote.target_user_id))]
    pub async fn apply(&self, vote: &Vote) -> PlebisciteResult<MutationOutcome> {
        let platform = &self.shared.platform;
        let Some(member) = platform.member(vote.guild_id, vote.target_user_id).await? else {
            warn!("Target left the guild");
            return Ok(MutationOutcome::TargetMissing);
        };

        match &vote.payload {
            VotePayload::Rename { new_name } => {
                if !member.manageable {
                    warn!("Cannot rename a member ranked above the bot");
                    return Ok(MutationOutcome::NotPermitted);
                }
                platform
                    .set_nickname(vote.guild_id, vote.target_user_id, new_name)
                    .await?;
            }
            VotePayload::Role { role_id, remove } => {
                if !self
                    .shared
                    .store
                    .is_cosmetic_role(vote.guild_id, *role_id)
                    .await?
                {
                    return Ok(MutationOutcome::NoLongerAllowed);
                }
                let Some(role) = platform.role(vote.guild_id, *role_id).await? else {
                    return Ok(MutationOutcome::RoleMissing);
                };
                if !role.editable {
                    warn!(%role_id, "Role ranks above the bot");
                    return Ok(MutationOutcome::NotPermitted);
                }
                match (*remove, member.has_role(*role_id)) {
                    (true, true) => {
                        platform
                            .remove_member_role(vote.guild_id, vote.target_user_id, *role_id)
                            .await?
                    }
                    (false, false) => {
                        platform
                            .add_member_role(vote.guild_id, vote.target_user_id, *role_id)
                            .await?
                    }
                    _ => return Ok(MutationOutcome::AlreadyInState),
                }
            }
        }
        info!("Vote outcome applied");
        Ok(MutationOutcome::Applied)
    }

    /// Abort all pending timers. Open votes resume on the next [`init`](Self::init).
    pub fn shutdown(&self) -> usize {
        self.shared.scheduler.shutdown()
    }

    async fn finish(&self, vote: &Vote) -> PlebisciteResult<Resolution> {
        let platform = &self.shared.platform;
        let config = &self.shared.config;

        if !platform
            .is_sendable_channel(vote.guild_id, vote.channel_id)
            .await?
        {
            warn!(channel_id = %vote.channel_id, "Vote channel is gone");
            return Ok(Resolution::Orphaned);
        }
        let Some(message) = platform
            .fetch_message(vote.channel_id, vote.message_id)
            .await?
        else {
            warn!("Announcement message is gone");
            return Ok(Resolution::Orphaned);
        };

        let yes = self.human_voters(vote, &config.yes_emoji).await?;
        let no = self.human_voters(vote, &config.no_emoji).await?;
        let outcome = decide(yes.len(), no.len(), config.required_yes_votes);
        info!(yes = yes.len(), no = no.len(), %outcome, "Vote tallied");

        platform
            .edit_message(
                vote.channel_id,
                vote.message_id,
                &result_text(&message.content, outcome, &yes, &no),
            )
            .await?;

        let mutation = if outcome.is_accepted() {
            Some(self.apply(vote).await?)
        } else {
            None
        };

        Ok(Resolution::Decided {
            outcome,
            yes: yes.len(),
            no: no.len(),
            mutation,
        })
    }

    async fn human_voters(&self, vote: &Vote, emoji: &str) -> PlebisciteResult<Vec<UserId>> {
        let voters = self
            .shared
            .platform
            .reaction_voters(vote.channel_id, vote.message_id, emoji)
            .await?;
        let mut ids: Vec<UserId> = Vec::with_capacity(voters.len());
        for voter in voters.into_iter().filter(|voter| !voter.bot) {
            if !ids.contains(&voter.user_id) {
                ids.push(voter.user_id);
            }
        }
        Ok(ids)
    }

    async fn vote_channel(&self, guild_id: GuildId) -> PlebisciteResult<ChannelId> {
        let Some(channel_id) = self
            .shared
            .store
            .guild_settings(guild_id)
            .await?
            .and_then(|settings| settings.vote_channel_id)
        else {
            return Err(VoteError::new(VoteErrorKind::ChannelNotConfigured).into());
        };
        if !self
            .shared
            .platform
            .is_sendable_channel(guild_id, channel_id)
            .await?
        {
            return Err(VoteError::new(VoteErrorKind::InvalidChannel).into());
        }
        Ok(channel_id)
    }

    async fn ensure_cosmetic_role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<()> {
        if self.shared.store.is_cosmetic_role(guild_id, role_id).await? {
            Ok(())
        } else {
            Err(VoteError::new(VoteErrorKind::RoleNotAllowed(role_id.get())).into())
        }
    }

    fn arm(&self, kind: VoteKind, message_id: MessageId, delay: Duration) {
        let service = self.clone();
        let delay = delay.to_std().unwrap_or_default();
        self.shared
            .scheduler
            .schedule(message_id, delay, move || service.resolve_logged(kind, message_id));
    }

    async fn resolve_logged(self, kind: VoteKind, message_id: MessageId) {
        if let Err(e) = self.resolve(kind, message_id).await {
            error!(error = %e, %message_id, %kind, "Failed to resolve vote");
        }
    }
}

/// Name rules for rename votes. Role votes always pass.
fn validate_change(change: &VotePayload) -> Result<(), VoteError> {
    if let VotePayload::Rename { new_name } = change {
        if new_name.contains('`') {
            return Err(VoteError::new(VoteErrorKind::NameContainsBacktick));
        }
        if new_name.chars().count() > MAX_NAME_CHARS {
            return Err(VoteError::new(VoteErrorKind::NameTooLong(MAX_NAME_CHARS)));
        }
    }
    Ok(())
}
