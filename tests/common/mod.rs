// ABOUTME: Shared helpers for integration tests
// ABOUTME: In-memory database construction and entity seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(dead_code)]

use fleet_core::auth::AuthManager;
use fleet_core::database::Database;
use fleet_core::models::{
    Account, NewAccount, NewOperatingCompany, NewVehicle, OperatingCompany, Vehicle,
};

pub const TEST_SECRET: &[u8] = b"integration-test-secret";
pub const TEST_PASSWORD: &str = "p@ss";

/// One pooled connection keeps every statement on the same in-memory store.
pub async fn test_database() -> Database {
    Database::new("sqlite::memory:", 1)
        .await
        .expect("in-memory database should open")
}

pub fn auth_manager() -> AuthManager {
    AuthManager::new(TEST_SECRET)
}

pub async fn seed_account(database: &Database, username: &str, disabled: bool) -> Account {
    database
        .create_account(NewAccount {
            username: username.into(),
            name: format!("Account {username}"),
            password: TEST_PASSWORD.into(),
            disabled: Some(disabled),
            ..NewAccount::default()
        })
        .await
        .expect("account seed should insert")
}

pub async fn seed_company(database: &Database, noc: &str, short_code: &str) -> OperatingCompany {
    database
        .create_operating_company(NewOperatingCompany {
            noc: noc.into(),
            short_code: short_code.into(),
            name: Some(format!("{noc} Buses")),
            ..NewOperatingCompany::default()
        })
        .await
        .expect("company seed should insert")
}

pub async fn seed_vehicle(database: &Database, fleet_no: &str, opco_id: Option<i64>) -> Vehicle {
    database
        .create_vehicle(NewVehicle {
            fleet_no: fleet_no.into(),
            opco_id,
        })
        .await
        .expect("vehicle seed should insert")
}
