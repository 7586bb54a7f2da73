//! PostgreSQL-backed [`PreferenceStore`] using Diesel.
//!
//! Usernames resolve to `users.id` first; an unknown username reads as "no
//! preferences" and fails writes with `UserNotFound`. The unique index on
//! `user_preferences.user_id` turns a racing second insert into `Conflict`.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{QueryFragment, QueryId};
use diesel::sql_types;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{PreferenceStore, PreferenceStoreError};
use crate::domain::{PreferenceRecord, Username};

use super::models::{NewPreferenceRow, PreferenceRow, PreferenceUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{user_preferences, users};

/// Diesel implementation of the [`PreferenceStore`] port.
#[derive(Clone)]
pub struct DieselPreferenceStore {
    pool: DbPool,
}

impl DieselPreferenceStore {
    /// Create a store that checks connections out of `pool` per call.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>,
        PreferenceStoreError,
    > {
        self.pool.get().await.map_err(map_pool_error)
    }
}

fn map_pool_error(error: PoolError) -> PreferenceStoreError {
    PreferenceStoreError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> PreferenceStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PreferenceStoreError::conflict(info.message())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PreferenceStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => PreferenceStoreError::query(info.message()),
        DieselError::NotFound => PreferenceStoreError::query("record not found"),
        other => PreferenceStoreError::query(other.to_string()),
    }
}

/// `SELECT users.id` for one username.
fn user_id_query(username: &str) -> users::BoxedQuery<'_, Pg, sql_types::Uuid> {
    users::table
        .filter(users::username.eq(username))
        .select(users::id)
        .into_boxed()
}

/// All preference rows for a user in ascending `id` order.
///
/// Ids are random UUIDs, so this order is stable but says nothing about
/// recency. It only matters for duplicate rows written before the unique
/// index existed, and then "last" is an arbitrary but repeatable pick.
fn records_query(user_id: Uuid) -> user_preferences::BoxedQuery<'static, Pg> {
    user_preferences::table
        .filter(user_preferences::user_id.eq(user_id))
        .order(user_preferences::id.asc())
        .into_boxed()
}

/// Rows for a user whose document text is present and non-empty.
fn populated_query(user_id: Uuid) -> user_preferences::BoxedQuery<'static, Pg> {
    user_preferences::table
        .filter(user_preferences::user_id.eq(user_id))
        .filter(user_preferences::preferences.is_not_null())
        .filter(user_preferences::preferences.ne(""))
        .into_boxed()
}

/// `INSERT` of one new row.
fn insert_statement<'a>(
    row: &'a NewPreferenceRow<'a>,
) -> impl QueryFragment<Pg> + QueryId + Send + 'a {
    diesel::insert_into(user_preferences::table).values(row)
}

/// `UPDATE` replacing the document text of every row owned by `user_id`.
fn update_statement<'a>(
    user_id: Uuid,
    changes: &'a PreferenceUpdate<'a>,
) -> impl QueryFragment<Pg> + QueryId + Send + 'a {
    diesel::update(user_preferences::table)
        .filter(user_preferences::user_id.eq(user_id))
        .set(changes)
}

/// `DELETE` of every row owned by `user_id`.
fn delete_statement(user_id: Uuid) -> impl QueryFragment<Pg> + QueryId + Send {
    diesel::delete(user_preferences::table).filter(user_preferences::user_id.eq(user_id))
}

async fn lookup_user_id(
    conn: &mut AsyncPgConnection,
    username: &Username,
) -> Result<Option<Uuid>, PreferenceStoreError> {
    user_id_query(username.as_ref())
        .first::<Uuid>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)
}

async fn require_user_id(
    conn: &mut AsyncPgConnection,
    username: &Username,
) -> Result<Uuid, PreferenceStoreError> {
    lookup_user_id(conn, username)
        .await?
        .ok_or_else(|| PreferenceStoreError::user_not_found(username.as_ref()))
}

#[async_trait]
impl PreferenceStore for DieselPreferenceStore {
    async fn is_user(&self, username: &Username) -> Result<bool, PreferenceStoreError> {
        let mut conn = self.connection().await?;
        Ok(lookup_user_id(&mut conn, username).await?.is_some())
    }

    async fn has_preferences(&self, username: &Username) -> Result<bool, PreferenceStoreError> {
        let mut conn = self.connection().await?;
        let Some(user_id) = lookup_user_id(&mut conn, username).await? else {
            return Ok(false);
        };
        let found = populated_query(user_id)
            .select(user_preferences::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.is_some())
    }

    async fn get_preferences(
        &self,
        username: &Username,
    ) -> Result<Vec<PreferenceRecord>, PreferenceStoreError> {
        let mut conn = self.connection().await?;
        let Some(user_id) = lookup_user_id(&mut conn, username).await? else {
            return Ok(Vec::new());
        };
        let rows = records_query(user_id)
            .select(PreferenceRow::as_select())
            .load::<PreferenceRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(PreferenceRecord::from).collect())
    }

    async fn insert_preferences(
        &self,
        username: &Username,
        preferences: &str,
    ) -> Result<(), PreferenceStoreError> {
        let mut conn = self.connection().await?;
        let user_id = require_user_id(&mut conn, username).await?;
        let row = NewPreferenceRow {
            user_id,
            preferences,
        };
        insert_statement(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update_preferences(
        &self,
        username: &Username,
        preferences: &str,
    ) -> Result<(), PreferenceStoreError> {
        let mut conn = self.connection().await?;
        let user_id = require_user_id(&mut conn, username).await?;
        let changes = PreferenceUpdate { preferences };
        let updated = update_statement(user_id, &changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            debug!(%username, "update matched no preference record");
        }
        Ok(())
    }

    async fn delete_preferences(&self, username: &Username) -> Result<(), PreferenceStoreError> {
        let mut conn = self.connection().await?;
        let user_id = require_user_id(&mut conn, username).await?;
        delete_statement(user_id)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
