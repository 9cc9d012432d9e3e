//! Discord client setup and lifecycle management.

use crate::{PlebisciteHandler, SerenityPlatform};
use plebiscite_error::{PlatformError, PlatformErrorKind, PlebisciteResult};
use plebiscite_interface::VoteStore;
use plebiscite_vote::{VoteConfig, VoteService};
use serenity::Client;
use serenity::all::{Http, ShardManager};
use std::sync::Arc;
use tracing::{info, instrument};

/// The vote bot: a Serenity client wired to a [`VoteService`].
///
/// # Example
/// ```no_run
/// use plebiscite_discord::PlebisciteBot;
/// use plebiscite_vote::{InMemoryVoteStore, VoteConfig};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("DISCORD_TOKEN")?;
///     let store = Arc::new(InMemoryVoteStore::new());
///     let mut bot = PlebisciteBot::new(token, store, VoteConfig::default()).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct PlebisciteBot<S> {
    client: Client,
    service: VoteService<S, SerenityPlatform>,
}

impl<S> PlebisciteBot<S>
where
    S: VoteStore + 'static,
{
    /// Build the client, the platform adapter and the vote service.
    ///
    /// Nothing connects until [`start`](Self::start); persisted votes are
    /// resumed on the first ready event.
    #[instrument(skip(token, store, config), fields(token_len = token.len()))]
    pub async fn new(token: String, store: Arc<S>, config: VoteConfig) -> PlebisciteResult<Self> {
        info!("Initializing vote bot");

        let platform = Arc::new(SerenityPlatform::new(Arc::new(Http::new(&token))));
        let service = VoteService::new(store, platform, config);

        let handler = PlebisciteHandler::new(service.clone());
        let intents = PlebisciteHandler::<S>::intents();
        info!(?intents, "Building Serenity client");

        let client = Client::builder(&token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                PlatformError::new(PlatformErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        Ok(Self { client, service })
    }

    /// Connect and run until the shards stop.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> PlebisciteResult<()> {
        info!("Starting Discord client");
        self.client.start().await.map_err(|e| {
            PlatformError::new(PlatformErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })?;
        Ok(())
    }

    /// Handle for stopping the gateway from another task.
    pub fn shard_manager(&self) -> Arc<ShardManager> {
        self.client.shard_manager.clone()
    }

    /// The vote service driven by this bot.
    pub fn service(&self) -> &VoteService<S, SerenityPlatform> {
        &self.service
    }
}
