// ABOUTME: Operating company repository including the two-phase confirmed-delete protocol
// ABOUTME: Classifies unique and referential violations into distinct conflict errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info, warn};

use super::{commit_row, rollback_quietly, Database};
use crate::constants::messages;
use crate::errors::{AppError, AppResult};
use crate::models::{DeleteReport, NewOperatingCompany, OperatingCompany};
use crate::pagination::{count_sql, ListParams, OrderWhitelist, Page};

/// Column order matches the `OrderWhitelist::OPERATING_COMPANY` positions.
const PROJECTION: &str = "id, noc, short_code, name";

fn row_to_company(row: &SqliteRow) -> AppResult<OperatingCompany> {
    Ok(OperatingCompany {
        id: row.try_get("id")?,
        noc: row.try_get("noc")?,
        short_code: row.try_get("short_code")?,
        name: row.try_get("name")?,
    })
}

impl Database {
    /// Create an operating company.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error when the payload carries an id, a
    /// conflict when `noc` or `short_code` collides, or an internal error
    /// for any other store failure.
    pub async fn create_operating_company(
        &self,
        new: NewOperatingCompany,
    ) -> AppResult<OperatingCompany> {
        if new.id.is_some() {
            return Err(AppError::bad_request(messages::MSG_ID_ON_CREATE));
        }

        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "INSERT INTO operating_company (noc, short_code, name) \
             VALUES ($1, $2, $3) RETURNING {PROJECTION}"
        ))
        .bind(&new.noc)
        .bind(&new.short_code)
        .bind(&new.name)
        .fetch_one(&mut *tx)
        .await;

        let company = commit_row(tx, fetched, row_to_company).await?;
        info!(company_id = company.id, noc = %company.noc, "created operating company");
        Ok(company)
    }

    /// Fetch an operating company by its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no row matches.
    pub async fn get_operating_company(&self, id: i64) -> AppResult<OperatingCompany> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECTION} FROM operating_company WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => row_to_company(&row),
            None => Err(AppError::not_found(messages::MSG_COMPANY_NOT_FOUND)),
        }
    }

    /// List operating companies with whitelisted ordering and bounded
    /// pagination.
    ///
    /// # Errors
    ///
    /// Returns an internal error for any store failure.
    pub async fn list_operating_companies(
        &self,
        params: &ListParams,
    ) -> AppResult<Page<OperatingCompany>> {
        let resolved = params.resolve(OrderWhitelist::OPERATING_COMPANY);

        if resolved.is_paged() {
            let sql = resolved.paged_sql("operating_company", PROJECTION);
            let rows = sqlx::query(&sql)
                .bind(resolved.limit)
                .bind(resolved.offset)
                .fetch_all(self.pool())
                .await?;

            let max = match rows.first() {
                Some(row) => row.try_get("full_count")?,
                None => 0,
            };
            let result = rows.iter().map(row_to_company).collect::<AppResult<_>>()?;

            debug!(rows = rows.len(), total = max, "listed operating companies");
            Ok(Page {
                result,
                meta: resolved.meta(max),
            })
        } else {
            let max = self.window_count(&count_sql("operating_company")).await?;
            Ok(Page {
                result: Vec::new(),
                meta: resolved.meta(max),
            })
        }
    }

    /// Write a fully populated operating company row.
    ///
    /// Callers resolve partial updates with [`OperatingCompany::merged`]
    /// first.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the row has disappeared, a conflict
    /// when a unique field collides, or an internal error for any other
    /// store failure.
    pub async fn update_operating_company(
        &self,
        company: &OperatingCompany,
    ) -> AppResult<OperatingCompany> {
        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "UPDATE operating_company SET noc = $1, short_code = $2, name = $3 \
             WHERE id = $4 RETURNING {PROJECTION}"
        ))
        .bind(&company.noc)
        .bind(&company.short_code)
        .bind(&company.name)
        .bind(company.id)
        .fetch_one(&mut *tx)
        .await;

        let updated = commit_row(tx, fetched, row_to_company).await?;
        info!(company_id = updated.id, "updated operating company");
        Ok(updated)
    }

    /// Two-phase delete of an operating company.
    ///
    /// With `confirmed = false` the delete is executed and then rolled
    /// back, reporting what it would have removed; with `confirmed = true`
    /// the same delete commits. Zero affected rows is not-found in either
    /// phase. A referential violation, rows still referencing the target,
    /// is a conflict with a message distinct from a uniqueness conflict so
    /// callers can tell "in use" from "did not exist".
    ///
    /// # Errors
    ///
    /// Returns a not-found, conflict, or internal error as described.
    pub async fn delete_operating_company(
        &self,
        id: i64,
        confirmed: bool,
    ) -> AppResult<DeleteReport> {
        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "DELETE FROM operating_company WHERE id = $1 RETURNING {PROJECTION}"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await;

        let rows = match fetched {
            Ok(rows) => rows,
            Err(error) => {
                rollback_quietly(tx).await;
                if let sqlx::Error::Database(db_err) = &error {
                    if db_err.is_foreign_key_violation() {
                        warn!(company_id = id, "delete blocked by assigned vehicles");
                        return Err(
                            AppError::conflict(messages::MSG_COMPANY_IN_USE).with_source(error)
                        );
                    }
                }
                return Err(AppError::from(error));
            }
        };

        if rows.is_empty() {
            rollback_quietly(tx).await;
            return Err(AppError::not_found(messages::MSG_COMPANY_NOT_FOUND));
        }

        let deleted = rows
            .iter()
            .map(row_to_company)
            .collect::<AppResult<Vec<_>>>()?;
        let length = deleted.len();

        if confirmed {
            tx.commit().await?;
            info!(company_id = id, rows = length, "deleted operating company");
            Ok(DeleteReport {
                message: format!("Deleted {length} row(s)!"),
                rows: deleted,
                length,
            })
        } else {
            rollback_quietly(tx).await;
            debug!(company_id = id, rows = length, "previewed delete");
            Ok(DeleteReport {
                message: format!(
                    "Deletion not confirmed! {length} row(s) would be deleted, \
                     submit again with confirmed=true to proceed."
                ),
                rows: deleted,
                length,
            })
        }
    }
}
