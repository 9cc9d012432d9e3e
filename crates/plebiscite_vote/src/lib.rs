//! Vote lifecycle engine for Plebiscite.
//!
//! A vote asks the guild to rename a member or to grant/revoke a cosmetic role.
//! This crate opens votes, keeps one expiration timer per open vote, and
//! resolves each vote exactly once by tallying reactions on its announcement.
//!
//! # Architecture
//!
//! - **Cooldown gate**: [`remaining_cooldown`] spaces out requests per user
//! - **Decision rule**: [`decide`] turns a tally into an [`Outcome`]
//! - **Scheduler**: [`ExpirationScheduler`] holds cancellable one-shot timers
//! - **Service**: [`VoteService`] ties storage, platform and timers together
//!
//! Storage and the chat platform are reached only through the
//! [`VoteStore`](plebiscite_interface::VoteStore) and
//! [`ChatPlatform`](plebiscite_interface::ChatPlatform) traits.
//!
//! # Example
//!
//! ```no_run
//! use plebiscite_vote::{InMemoryVoteStore, VoteConfig, VoteRequest, VoteService};
//! use plebiscite_interface::{ChatPlatform, GuildId, UserId, VotePayload};
//! use std::sync::Arc;
//!
//! # async fn example<P: ChatPlatform + 'static>(platform: Arc<P>) -> plebiscite_error::PlebisciteResult<()> {
//! let service = VoteService::new(Arc::new(InMemoryVoteStore::new()), platform, VoteConfig::default());
//! service.init().await?;
//!
//! let started = service
//!     .request_vote(
//!         UserId(1),
//!         VoteRequest {
//!             guild_id: GuildId(10),
//!             target_user_id: UserId(2),
//!             requester_id: None,
//!             change: VotePayload::Rename { new_name: "Bob".into() },
//!         },
//!     )
//!     .await?;
//! println!("{}", started.link());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod cooldown;
mod decision;
mod format;
mod in_memory;
mod request;
mod scheduler;
mod service;

pub use config::{MAX_DURATION_SECS, VoteConfig};
pub use cooldown::{format_remaining, remaining_cooldown};
pub use decision::{Outcome, decide};
pub use format::{announcement_text, result_text};
pub use in_memory::InMemoryVoteStore;
pub use request::{VoteRequest, VoteStarted};
pub use scheduler::ExpirationScheduler;
pub use service::{MAX_NAME_CHARS, MutationOutcome, Resolution, VoteService};
