//! Discord integration for Plebiscite.
//!
//! - [`SerenityPlatform`] implements [`plebiscite_interface::ChatPlatform`]
//!   over Serenity's HTTP client.
//! - [`commands`] defines the `/투표` and `/설정` slash commands and maps
//!   them onto the vote service.
//! - [`PlebisciteHandler`] and [`PlebisciteBot`] run the gateway connection.

#![warn(missing_docs)]

mod client;
pub mod commands;
mod conversions;
mod handler;
mod platform;

pub use client::PlebisciteBot;
pub use commands::{OptionArg, PlebisciteCommand};
pub use handler::PlebisciteHandler;
pub use platform::SerenityPlatform;
