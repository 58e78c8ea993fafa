// ABOUTME: Account repository: unique-key lookups, listing, insert, and full-row update
// ABOUTME: Hashes credentials on creation and keeps store-generated identity fields authoritative
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use super::{commit_row, Database};
use crate::auth;
use crate::constants::messages;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, NewAccount};
use crate::pagination::{count_sql, ListParams, OrderWhitelist, Page};

/// Column order matches the `OrderWhitelist::ACCOUNT` positions.
const PROJECTION: &str = "id, uuid, role, username, name, password_hash, \
                          password_last_modified, disabled, created_at, last_modified";

fn row_to_account(row: &SqliteRow) -> AppResult<Account> {
    let uuid_text: String = row.try_get("uuid")?;
    let role_text: String = row.try_get("role")?;

    Ok(Account {
        id: row.try_get("id")?,
        uuid: Uuid::parse_str(&uuid_text)
            .map_err(|e| AppError::internal("Stored account uuid is not valid").with_source(e))?,
        role: role_text.parse()?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        password_last_modified: row.try_get("password_last_modified")?,
        disabled: row.try_get("disabled")?,
        created_at: row.try_get("created_at")?,
        last_modified: row.try_get("last_modified")?,
    })
}

impl Database {
    /// Create an account, hashing the supplied plaintext password.
    ///
    /// Identity is store-assigned: the row uuid is generated here, the id
    /// and timestamps by the store, and the returned row is the freshly
    /// materialized projection rather than the caller's input.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the payload carries an id, a
    /// conflict when the username collides, or an internal error for any
    /// other store failure.
    pub async fn create_account(&self, new: NewAccount) -> AppResult<Account> {
        if new.id.is_some() {
            return Err(AppError::bad_request(messages::MSG_ID_ON_CREATE));
        }

        let password_hash = auth::hash_password(&new.password)?;
        let uuid = Uuid::new_v4();

        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "INSERT INTO account (uuid, role, username, name, password_hash, disabled) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROJECTION}"
        ))
        .bind(uuid.to_string())
        .bind(new.role.as_str())
        .bind(&new.username)
        .bind(&new.name)
        .bind(&password_hash)
        .bind(new.disabled.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await;

        let account = commit_row(tx, fetched, row_to_account).await?;
        info!(account_id = account.id, username = %account.username, "created account");
        Ok(account)
    }

    /// Fetch an account by its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no row matches.
    pub async fn get_account_by_id(&self, id: i64) -> AppResult<Account> {
        let row = sqlx::query(&format!("SELECT {PROJECTION} FROM account WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(AppError::not_found(messages::MSG_ACCOUNT_NOT_FOUND_BY_ID)),
        }
    }

    /// Fetch an account by its identity uuid.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no row matches.
    pub async fn get_account_by_uuid(&self, uuid: Uuid) -> AppResult<Account> {
        let row = sqlx::query(&format!("SELECT {PROJECTION} FROM account WHERE uuid = $1"))
            .bind(uuid.to_string())
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(AppError::not_found(messages::MSG_ACCOUNT_NOT_FOUND_BY_UUID)),
        }
    }

    /// Fetch an account by its unique username; the login path uses this.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no row matches.
    pub async fn get_account_by_username(&self, username: &str) -> AppResult<Account> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECTION} FROM account WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => row_to_account(&row),
            None => Err(AppError::not_found(
                messages::MSG_ACCOUNT_NOT_FOUND_BY_USERNAME,
            )),
        }
    }

    /// List accounts with whitelisted ordering and bounded pagination.
    ///
    /// # Errors
    ///
    /// Returns an internal error for any store failure.
    pub async fn list_accounts(&self, params: &ListParams) -> AppResult<Page<Account>> {
        let resolved = params.resolve(OrderWhitelist::ACCOUNT);

        if resolved.is_paged() {
            let sql = resolved.paged_sql("account", PROJECTION);
            let rows = sqlx::query(&sql)
                .bind(resolved.limit)
                .bind(resolved.offset)
                .fetch_all(self.pool())
                .await?;

            let max = match rows.first() {
                Some(row) => row.try_get("full_count")?,
                None => 0,
            };
            let result = rows.iter().map(row_to_account).collect::<AppResult<_>>()?;

            debug!(rows = rows.len(), total = max, "listed accounts");
            Ok(Page {
                result,
                meta: resolved.meta(max),
            })
        } else {
            let max = self.window_count(&count_sql("account")).await?;
            Ok(Page {
                result: Vec::new(),
                meta: resolved.meta(max),
            })
        }
    }

    /// Write a fully populated account row.
    ///
    /// Callers resolve partial updates with [`Account::merged`] first; this
    /// write replaces every mutable column, including the identity uuid, and
    /// lets the store stamp `last_modified`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the row has disappeared, a conflict
    /// when a unique field collides, or an internal error for any other
    /// store failure.
    pub async fn update_account(&self, account: &Account) -> AppResult<Account> {
        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "UPDATE account SET uuid = $1, role = $2, username = $3, name = $4, \
             disabled = $5, last_modified = CURRENT_TIMESTAMP \
             WHERE id = $6 RETURNING {PROJECTION}"
        ))
        .bind(account.uuid.to_string())
        .bind(account.role.as_str())
        .bind(&account.username)
        .bind(&account.name)
        .bind(account.disabled)
        .bind(account.id)
        .fetch_one(&mut *tx)
        .await;

        let updated = commit_row(tx, fetched, row_to_account).await?;
        info!(account_id = updated.id, "updated account");
        Ok(updated)
    }

    /// Replace an account's password digest, letting the store stamp
    /// `password_last_modified`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the row has disappeared or an
    /// internal error for any other store failure.
    pub async fn update_account_password(&self, id: i64, plaintext: &str) -> AppResult<Account> {
        let password_hash = auth::hash_password(plaintext)?;

        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "UPDATE account SET password_hash = $1, \
             password_last_modified = CURRENT_TIMESTAMP, last_modified = CURRENT_TIMESTAMP \
             WHERE id = $2 RETURNING {PROJECTION}"
        ))
        .bind(&password_hash)
        .bind(id)
        .fetch_one(&mut *tx)
        .await;

        let updated = commit_row(tx, fetched, row_to_account).await?;
        info!(account_id = updated.id, "rotated account password");
        Ok(updated)
    }
}
