// ABOUTME: Database manager over a bounded SQLite connection pool
// ABOUTME: Owns schema bootstrap, health check, and shared transaction helpers for the repositories
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Management
//!
//! [`Database`] wraps a bounded `sqlx` pool. Reads execute directly against
//! the pool; every write acquires its own connection and opens its own
//! transaction, committing on success and rolling back on any failure, so
//! concurrent request handlers never share mutable cursor state.
//!
//! Foreign keys are switched on per connection so referential violations
//! surface where the confirmed-delete protocol needs them.

mod accounts;
mod companies;
mod vehicles;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite, Transaction};
use tracing::{info, warn};

use crate::constants::messages;
use crate::errors::{AppError, AppResult};

/// Database manager for the fleet dataset
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open a bounded pool against the given connection string and run the
    /// schema bootstrap.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the bootstrap fails.
    pub async fn new(database_url: &str, max_connections: u32) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(AppError::from)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.migrate().await?;

        info!(max_connections, "database ready");
        Ok(database)
    }

    /// Create the three tables and their supporting indexes, idempotently.
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails.
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS account (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uuid TEXT UNIQUE NOT NULL,
                role TEXT NOT NULL DEFAULT 'STD' CHECK (role IN ('STD', 'ADM')),
                username TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                password_last_modified DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                disabled BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                last_modified DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS operating_company (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                noc TEXT UNIQUE NOT NULL,
                short_code TEXT UNIQUE NOT NULL,
                name TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS vehicle (
                fleet_no TEXT PRIMARY KEY,
                opco_id INTEGER REFERENCES operating_company(id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_account_username ON account(username)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_vehicle_opco ON vehicle(opco_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Verify the store answers a round trip.
    ///
    /// # Errors
    ///
    /// Returns a service-unavailable error when the store does not answer
    /// or answers with the wrong value.
    pub async fn ping(&self) -> AppResult<()> {
        let row = sqlx::query("SELECT 1 AS ready")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::service_unavailable(messages::MSG_DATABASE_NOT_READY).with_source(e)
            })?;

        let ready: i64 = row
            .try_get("ready")
            .map_err(|e| {
                AppError::service_unavailable(messages::MSG_DATABASE_NOT_READY).with_source(e)
            })?;

        if ready == 1 {
            Ok(())
        } else {
            Err(AppError::service_unavailable(
                messages::MSG_DATABASE_NOT_READY,
            ))
        }
    }

    pub(crate) const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run a count-only window query; an empty table yields zero.
    pub(crate) async fn window_count(&self, sql: &str) -> AppResult<i64> {
        let row = sqlx::query(sql).fetch_optional(&self.pool).await?;
        Ok(match row {
            Some(row) => row.try_get("full_count")?,
            None => 0,
        })
    }
}

/// Roll a transaction back without masking the error that got us here
pub(crate) async fn rollback_quietly(tx: Transaction<'_, Sqlite>) {
    if let Err(error) = tx.rollback().await {
        warn!("transaction rollback failed: {error}");
    }
}

/// Finish a single-statement write: map and commit on success, roll back
/// and classify on failure.
pub(crate) async fn commit_row<T>(
    tx: Transaction<'_, Sqlite>,
    fetched: Result<SqliteRow, sqlx::Error>,
    map: impl FnOnce(&SqliteRow) -> AppResult<T>,
) -> AppResult<T> {
    match fetched {
        Ok(row) => match map(&row) {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(error) => {
                rollback_quietly(tx).await;
                Err(error)
            }
        },
        Err(error) => {
            rollback_quietly(tx).await;
            Err(AppError::from(error))
        }
    }
}
