//! Plebiscite: guild members vote to rename each other or hand out cosmetic
//! roles.
//!
//! This crate holds the binary's configuration file and log setup. The vote
//! lifecycle lives in `plebiscite_vote`, storage in `plebiscite_database` and
//! the Discord glue in `plebiscite_discord`.

#![warn(missing_docs)]

mod config;
mod observability;

pub use config::{BotConfig, DatabaseConfig, LoggingConfig};
pub use observability::init_observability;
