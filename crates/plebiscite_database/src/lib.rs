//! PostgreSQL persistence for Plebiscite.
//!
//! This crate provides the diesel schema, row models, embedded migrations and
//! [`PostgresVoteStore`], the production implementation of
//! [`plebiscite_interface::VoteStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use plebiscite_database::{establish_pool, run_migrations, PostgresVoteStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = establish_pool("postgres://localhost/plebiscite", 8)?;
//! run_migrations(&pool)?;
//! let store = PostgresVoteStore::new(pool);
//! # Ok(())
//! # }
//! ```

mod connection;
mod models;
mod vote_store;

pub mod schema;

pub use connection::{PgPool, establish_pool, run_migrations};
pub use models::{
    CosmeticRoleRow, GuildSettingsRow, RenameVoteRow, RoleVoteRow, UserCooldownRow, VoteRow,
};
pub use vote_store::PostgresVoteStore;

use plebiscite_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
