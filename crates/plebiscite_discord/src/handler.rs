//! Serenity event handler for the vote bot.
//!
//! Registers slash commands when the gateway is ready, resumes persisted
//! votes once, and routes command interactions to the vote service.

use crate::{PlebisciteCommand, SerenityPlatform, commands};
use plebiscite_error::PlebisciteError;
use plebiscite_interface::{GuildId, UserId, VoteStore};
use plebiscite_vote::VoteService;
use serenity::all::{
    Command, CommandInteraction, CreateEmbed, EditInteractionResponse, Interaction, Ready,
};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::gateway::GatewayIntents;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

const ERROR_COLOR: u32 = 0xED4245;
const INTERNAL_ERROR_TEXT: &str = "An internal error occurred.";
const GUILD_ONLY_TEXT: &str = "서버에서만 사용할 수 있는 명령어예요.";

/// Event handler driving a [`VoteService`] from Discord events.
pub struct PlebisciteHandler<S> {
    service: VoteService<S, SerenityPlatform>,
    resumed: AtomicBool,
}

impl<S> PlebisciteHandler<S>
where
    S: VoteStore + 'static,
{
    /// Wrap a vote service.
    pub fn new(service: VoteService<S, SerenityPlatform>) -> Self {
        Self {
            service,
            resumed: AtomicBool::new(false),
        }
    }

    /// Gateway intents the bot needs: guild metadata, messages and reactions.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
    }

    async fn handle_command(&self, ctx: &Context, interaction: &CommandInteraction) {
        if let Err(e) = interaction.defer_ephemeral(&ctx.http).await {
            warn!(error = %e, command = %interaction.data.name, "Failed to defer interaction");
            return;
        }

        let response = match interaction.guild_id {
            Some(guild_id) => self.run(interaction, GuildId(guild_id.get())).await,
            None => EditInteractionResponse::new().content(GUILD_ONLY_TEXT),
        };

        if let Err(e) = interaction.edit_response(&ctx.http, response).await {
            warn!(error = %e, command = %interaction.data.name, "Failed to send reply");
        }
    }

    async fn run(&self, interaction: &CommandInteraction, guild_id: GuildId) -> EditInteractionResponse {
        let invoker = UserId(interaction.user.id.get());
        let options = interaction.data.options();
        let command = match PlebisciteCommand::parse(&interaction.data.name, &options) {
            Ok(Some(command)) => command,
            Ok(None) => {
                warn!(command = %interaction.data.name, "Unrecognized command shape");
                return error_response(INTERNAL_ERROR_TEXT.to_string());
            }
            Err(e) => return error_response(e.kind.to_string()),
        };

        match commands::execute(&self.service, guild_id, invoker, command).await {
            Ok(reply) => EditInteractionResponse::new().content(reply),
            Err(e) => error_response(reply_for_error(&e)),
        }
    }
}

fn reply_for_error(err: &PlebisciteError) -> String {
    match err.user_message() {
        Some(message) => message,
        None => {
            error!(error = %err, "Command failed");
            INTERNAL_ERROR_TEXT.to_string()
        }
    }
}

fn error_response(message: String) -> EditInteractionResponse {
    EditInteractionResponse::new().embed(
        CreateEmbed::new()
            .description(message)
            .color(ERROR_COLOR),
    )
}

#[async_trait]
impl<S> EventHandler for PlebisciteHandler<S>
where
    S: VoteStore + 'static,
{
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            bot_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "Bot connected to Discord"
        );

        match Command::set_global_commands(&ctx.http, commands::definitions()).await {
            Ok(registered) => info!(count = registered.len(), "Registered slash commands"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }

        // Ready fires again after every reconnect.
        if self.resumed.swap(true, Ordering::SeqCst) {
            debug!("Votes already resumed");
            return;
        }
        match self.service.init().await {
            Ok(count) => info!(count, "Resumed open votes"),
            Err(e) => {
                self.resumed.store(false, Ordering::SeqCst);
                error!(error = %e, "Failed to resume open votes");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            debug!(command = %command.data.name, user = %command.user.id, "Command received");
            self.handle_command(&ctx, &command).await;
        }
    }
}
