// ABOUTME: Vehicle repository: fleet-number lookups, listing, insert, and full-row update
// ABOUTME: The fleet number is the caller-supplied primary identifier, unlike the other entities
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};

use super::{commit_row, Database};
use crate::constants::messages;
use crate::errors::{AppError, AppResult};
use crate::models::{NewVehicle, Vehicle};
use crate::pagination::{count_sql, ListParams, OrderWhitelist, Page};

/// Column order matches the `OrderWhitelist::VEHICLE` positions.
const PROJECTION: &str = "fleet_no, opco_id";

fn row_to_vehicle(row: &SqliteRow) -> AppResult<Vehicle> {
    Ok(Vehicle {
        fleet_no: row.try_get("fleet_no")?,
        opco_id: row.try_get("opco_id")?,
    })
}

impl Database {
    /// Create a vehicle.
    ///
    /// # Errors
    ///
    /// Returns a conflict when the fleet number already exists, or an
    /// internal error for any other store failure, including an `opco_id`
    /// that references no operating company.
    pub async fn create_vehicle(&self, new: NewVehicle) -> AppResult<Vehicle> {
        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "INSERT INTO vehicle (fleet_no, opco_id) VALUES ($1, $2) RETURNING {PROJECTION}"
        ))
        .bind(&new.fleet_no)
        .bind(new.opco_id)
        .fetch_one(&mut *tx)
        .await;

        let vehicle = commit_row(tx, fetched, row_to_vehicle).await?;
        info!(fleet_no = %vehicle.fleet_no, "created vehicle");
        Ok(vehicle)
    }

    /// Fetch a vehicle by its fleet number.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no row matches.
    pub async fn get_vehicle(&self, fleet_no: &str) -> AppResult<Vehicle> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECTION} FROM vehicle WHERE fleet_no = $1"
        ))
        .bind(fleet_no)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => row_to_vehicle(&row),
            None => Err(AppError::not_found(messages::MSG_VEHICLE_NOT_FOUND)),
        }
    }

    /// List vehicles with whitelisted ordering and bounded pagination.
    ///
    /// # Errors
    ///
    /// Returns an internal error for any store failure.
    pub async fn list_vehicles(&self, params: &ListParams) -> AppResult<Page<Vehicle>> {
        let resolved = params.resolve(OrderWhitelist::VEHICLE);

        if resolved.is_paged() {
            let sql = resolved.paged_sql("vehicle", PROJECTION);
            let rows = sqlx::query(&sql)
                .bind(resolved.limit)
                .bind(resolved.offset)
                .fetch_all(self.pool())
                .await?;

            let max = match rows.first() {
                Some(row) => row.try_get("full_count")?,
                None => 0,
            };
            let result = rows.iter().map(row_to_vehicle).collect::<AppResult<_>>()?;

            debug!(rows = rows.len(), total = max, "listed vehicles");
            Ok(Page {
                result,
                meta: resolved.meta(max),
            })
        } else {
            let max = self.window_count(&count_sql("vehicle")).await?;
            Ok(Page {
                result: Vec::new(),
                meta: resolved.meta(max),
            })
        }
    }

    /// Write a fully populated vehicle row.
    ///
    /// Callers resolve partial updates with [`Vehicle::merged`] first.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the row has disappeared or an
    /// internal error for any other store failure.
    pub async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<Vehicle> {
        let mut tx = self.pool().begin().await?;
        let fetched = sqlx::query(&format!(
            "UPDATE vehicle SET opco_id = $1 WHERE fleet_no = $2 RETURNING {PROJECTION}"
        ))
        .bind(vehicle.opco_id)
        .bind(&vehicle.fleet_no)
        .fetch_one(&mut *tx)
        .await;

        let updated = commit_row(tx, fetched, row_to_vehicle).await?;
        info!(fleet_no = %updated.fleet_no, "updated vehicle");
        Ok(updated)
    }
}
