//! PostgreSQL implementation of [`VoteStore`].

use crate::DatabaseResult;
use crate::connection::PgPool;
use crate::models::{
    CosmeticRoleRow, GuildSettingsRow, RenameVoteRow, RoleVoteRow, UserCooldownRow, VoteRow,
};
use crate::schema::{cosmetic_roles, guild_settings, rename_votes, role_votes, user_cooldowns};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use plebiscite_error::{DatabaseError, DatabaseErrorKind, PlebisciteResult};
use plebiscite_interface::{
    ChannelId, CosmeticRole, GuildId, GuildSettings, MessageId, RoleId, UserCooldown, UserId,
    Vote, VoteKind, VoteStore,
};
use tracing::{debug, instrument};

/// Database-backed vote store.
///
/// Every query checks a connection out of the pool and runs on the blocking
/// thread pool, so callers never stall the async runtime.
#[derive(Clone)]
pub struct PostgresVoteStore {
    pool: PgPool,
}

impl PostgresVoteStore {
    /// Create a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, op: F) -> PlebisciteResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))?;
        Ok(result?)
    }
}

#[async_trait]
impl VoteStore for PostgresVoteStore {
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn guild_settings(&self, guild_id: GuildId) -> PlebisciteResult<Option<GuildSettings>> {
        let id = guild_id.get() as i64;
        let row = self
            .run(move |conn| {
                guild_settings::table
                    .find(id)
                    .select(GuildSettingsRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(DatabaseError::from)
            })
            .await?;
        Ok(row.map(GuildSettings::from))
    }

    #[instrument(skip(self), fields(guild_id = %guild_id, channel_id = %channel_id))]
    async fn set_vote_channel(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> PlebisciteResult<()> {
        let row = GuildSettingsRow {
            guild_id: guild_id.get() as i64,
            vote_channel_id: Some(channel_id.get() as i64),
        };
        self.run(move |conn| {
            diesel::insert_into(guild_settings::table)
                .values(&row)
                .on_conflict(guild_settings::guild_id)
                .do_update()
                .set(guild_settings::vote_channel_id.eq(row.vote_channel_id))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(guild_id = %guild_id, role_id = %role_id))]
    async fn is_cosmetic_role(&self, guild_id: GuildId, role_id: RoleId) -> PlebisciteResult<bool> {
        let (guild, role) = (guild_id.get() as i64, role_id.get() as i64);
        self.run(move |conn| {
            diesel::select(diesel::dsl::exists(
                cosmetic_roles::table
                    .filter(cosmetic_roles::role_id.eq(role))
                    .filter(cosmetic_roles::guild_id.eq(guild)),
            ))
            .get_result(conn)
            .map_err(DatabaseError::from)
        })
        .await
    }

    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn cosmetic_role_ids(&self, guild_id: GuildId) -> PlebisciteResult<Vec<RoleId>> {
        let guild = guild_id.get() as i64;
        let ids: Vec<i64> = self
            .run(move |conn| {
                cosmetic_roles::table
                    .filter(cosmetic_roles::guild_id.eq(guild))
                    .select(cosmetic_roles::role_id)
                    .order(cosmetic_roles::role_id.asc())
                    .load(conn)
                    .map_err(DatabaseError::from)
            })
            .await?;
        Ok(ids.into_iter().map(|id| RoleId(id as u64)).collect())
    }

    #[instrument(skip(self), fields(guild_id = %role.guild_id, role_id = %role.role_id))]
    async fn add_cosmetic_role(&self, role: CosmeticRole) -> PlebisciteResult<bool> {
        let row = CosmeticRoleRow::from(role);
        let inserted = self
            .run(move |conn| {
                diesel::insert_into(cosmetic_roles::table)
                    .values(&row)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(DatabaseError::from)
            })
            .await?;
        Ok(inserted > 0)
    }

    #[instrument(skip(self), fields(guild_id = %guild_id, role_id = %role_id))]
    async fn remove_cosmetic_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> PlebisciteResult<bool> {
        let (guild, role) = (guild_id.get() as i64, role_id.get() as i64);
        let deleted = self
            .run(move |conn| {
                diesel::delete(
                    cosmetic_roles::table
                        .filter(cosmetic_roles::role_id.eq(role))
                        .filter(cosmetic_roles::guild_id.eq(guild)),
                )
                .execute(conn)
                .map_err(DatabaseError::from)
            })
            .await?;
        Ok(deleted > 0)
    }

    #[instrument(skip(self), fields(user_id = %user_id, guild_id = %guild_id))]
    async fn user_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> PlebisciteResult<Option<UserCooldown>> {
        let key = (user_id.get() as i64, guild_id.get() as i64);
        let row = self
            .run(move |conn| {
                user_cooldowns::table
                    .find(key)
                    .select(UserCooldownRow::as_select())
                    .first(conn)
                    .optional()
                    .map_err(DatabaseError::from)
            })
            .await?;
        Ok(row.map(UserCooldown::from))
    }

    #[instrument(skip(self), fields(user_id = %user_id, guild_id = %guild_id))]
    async fn touch_cooldown(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        at: DateTime<Utc>,
    ) -> PlebisciteResult<()> {
        let row = UserCooldownRow {
            user_id: user_id.get() as i64,
            guild_id: guild_id.get() as i64,
            last_request_at: Some(at),
        };
        self.run(move |conn| {
            diesel::insert_into(user_cooldowns::table)
                .values(&row)
                .on_conflict((user_cooldowns::user_id, user_cooldowns::guild_id))
                .do_update()
                .set(user_cooldowns::last_request_at.eq(row.last_request_at))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, vote), fields(kind = %vote.kind(), message_id = %vote.message_id))]
    async fn insert_vote(&self, vote: &Vote) -> PlebisciteResult<()> {
        let row = VoteRow::from(vote);
        self.run(move |conn| {
            match row {
                VoteRow::Rename(row) => diesel::insert_into(rename_votes::table)
                    .values(&row)
                    .execute(conn),
                VoteRow::Role(row) => diesel::insert_into(role_votes::table)
                    .values(&row)
                    .execute(conn),
            }
            .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn open_votes(&self, kind: VoteKind) -> PlebisciteResult<Vec<Vote>> {
        let votes = self
            .run(move |conn| {
                let votes: Vec<Vote> = match kind {
                    VoteKind::Rename => rename_votes::table
                        .filter(rename_votes::has_ended.eq(false))
                        .order(rename_votes::started_at.asc())
                        .select(RenameVoteRow::as_select())
                        .load(conn)?
                        .into_iter()
                        .map(Vote::from)
                        .collect(),
                    VoteKind::Role => role_votes::table
                        .filter(role_votes::has_ended.eq(false))
                        .order(role_votes::started_at.asc())
                        .select(RoleVoteRow::as_select())
                        .load(conn)?
                        .into_iter()
                        .map(Vote::from)
                        .collect(),
                };
                Ok(votes)
            })
            .await?;
        debug!(count = votes.len(), "Loaded open votes");
        Ok(votes)
    }

    #[instrument(skip(self), fields(message_id = %message_id))]
    async fn claim_vote(
        &self,
        kind: VoteKind,
        message_id: MessageId,
    ) -> PlebisciteResult<Option<Vote>> {
        let id = message_id.get() as i64;
        self.run(move |conn| {
            let claimed = match kind {
                VoteKind::Rename => diesel::update(
                    rename_votes::table
                        .filter(rename_votes::message_id.eq(id))
                        .filter(rename_votes::has_ended.eq(false)),
                )
                .set(rename_votes::has_ended.eq(true))
                .returning(RenameVoteRow::as_returning())
                .get_result(conn)
                .optional()?
                .map(Vote::from),
                VoteKind::Role => diesel::update(
                    role_votes::table
                        .filter(role_votes::message_id.eq(id))
                        .filter(role_votes::has_ended.eq(false)),
                )
                .set(role_votes::has_ended.eq(true))
                .returning(RoleVoteRow::as_returning())
                .get_result(conn)
                .optional()?
                .map(Vote::from),
            };
            Ok(claimed)
        })
        .await
    }
}
