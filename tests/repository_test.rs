// ABOUTME: Integration tests for the transactional repositories
// ABOUTME: Covers store-assigned identity, conflict classification, merge updates, and persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use fleet_core::constants::messages;
use fleet_core::database::Database;
use fleet_core::errors::ErrorKind;
use fleet_core::models::{
    AccountPatch, NewAccount, NewOperatingCompany, NewVehicle, OperatingCompanyPatch, VehiclePatch,
};
use fleet_core::pagination::ListParams;

#[tokio::test]
async fn test_create_account_assigns_identity_and_hashes_password() {
    let database = common::test_database().await;

    let account = common::seed_account(&database, "alice", false).await;

    assert!(account.id > 0);
    assert!(!account.uuid.is_nil());
    assert_ne!(account.password_hash, common::TEST_PASSWORD);
    assert!(fleet_core::auth::verify_password(
        common::TEST_PASSWORD,
        &account.password_hash
    ));
}

#[tokio::test]
async fn test_create_rejects_caller_supplied_id() {
    let database = common::test_database().await;

    let account_error = database
        .create_account(NewAccount {
            id: Some(99),
            username: "alice".into(),
            name: "Alice".into(),
            password: common::TEST_PASSWORD.into(),
            ..NewAccount::default()
        })
        .await
        .unwrap_err();
    let company_error = database
        .create_operating_company(NewOperatingCompany {
            id: Some(99),
            noc: "ABCD".into(),
            short_code: "ABC".into(),
            ..NewOperatingCompany::default()
        })
        .await
        .unwrap_err();

    assert_eq!(account_error.kind, ErrorKind::BadRequest);
    assert_eq!(company_error.kind, ErrorKind::BadRequest);
    assert_eq!(account_error.message, messages::MSG_ID_ON_CREATE);
}

#[tokio::test]
async fn test_duplicate_username_is_a_conflict() {
    let database = common::test_database().await;
    common::seed_account(&database, "alice", false).await;

    let error = database
        .create_account(NewAccount {
            username: "alice".into(),
            name: "Another Alice".into(),
            password: common::TEST_PASSWORD.into(),
            ..NewAccount::default()
        })
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Conflict);
    assert_eq!(error.message, messages::MSG_DUPLICATE_UNIQUE_FIELD);
}

#[tokio::test]
async fn test_duplicate_noc_conflicts_and_store_keeps_original() {
    let database = common::test_database().await;
    let original = common::seed_company(&database, "ABCD", "ABC").await;

    let error = database
        .create_operating_company(NewOperatingCompany {
            noc: "ABCD".into(),
            short_code: "ZZZ".into(),
            name: Some("Impostor Buses".into()),
            ..NewOperatingCompany::default()
        })
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Conflict);

    let page = database
        .list_operating_companies(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(page.meta.max, 1);
    assert_eq!(page.result[0], original);
}

#[tokio::test]
async fn test_unique_key_lookups_and_not_found_messages() {
    let database = common::test_database().await;
    let account = common::seed_account(&database, "alice", false).await;

    assert_eq!(
        database.get_account_by_id(account.id).await.unwrap().id,
        account.id
    );
    assert_eq!(
        database
            .get_account_by_uuid(account.uuid)
            .await
            .unwrap()
            .username,
        "alice"
    );
    assert_eq!(
        database
            .get_account_by_username("alice")
            .await
            .unwrap()
            .uuid,
        account.uuid
    );

    let by_id = database.get_account_by_id(9999).await.unwrap_err();
    assert_eq!(by_id.kind, ErrorKind::NotFound);
    assert_eq!(by_id.message, messages::MSG_ACCOUNT_NOT_FOUND_BY_ID);

    let by_username = database.get_account_by_username("nobody").await.unwrap_err();
    assert_eq!(by_username.message, messages::MSG_ACCOUNT_NOT_FOUND_BY_USERNAME);

    let company = database.get_operating_company(9999).await.unwrap_err();
    assert_eq!(company.message, messages::MSG_COMPANY_NOT_FOUND);

    let vehicle = database.get_vehicle("00000").await.unwrap_err();
    assert_eq!(vehicle.message, messages::MSG_VEHICLE_NOT_FOUND);
}

#[tokio::test]
async fn test_partial_update_merges_against_stored_row() {
    let database = common::test_database().await;
    let account = common::seed_account(&database, "alice", false).await;

    let merged = account
        .merged(AccountPatch {
            name: Some("Alice Renamed".into()),
            ..AccountPatch::default()
        })
        .unwrap();
    let updated = database.update_account(&merged).await.unwrap();

    assert_eq!(updated.name, "Alice Renamed");
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.uuid, account.uuid);
    assert_eq!(updated.password_hash, account.password_hash);
}

#[tokio::test]
async fn test_patch_with_mismatched_id_is_a_bad_request() {
    let database = common::test_database().await;
    let account = common::seed_account(&database, "alice", false).await;

    let error = account
        .merged(AccountPatch {
            id: Some(account.id + 1),
            name: Some("Hijack".into()),
            ..AccountPatch::default()
        })
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::BadRequest);
    assert_eq!(error.message, messages::MSG_ID_MISMATCH);
}

#[tokio::test]
async fn test_company_update_keeps_absent_fields() {
    let database = common::test_database().await;
    let company = common::seed_company(&database, "ABCD", "ABC").await;

    let merged = company
        .merged(OperatingCompanyPatch {
            name: Some("Renamed Buses".into()),
            ..OperatingCompanyPatch::default()
        })
        .unwrap();
    let updated = database.update_operating_company(&merged).await.unwrap();

    assert_eq!(updated.noc, "ABCD");
    assert_eq!(updated.short_code, "ABC");
    assert_eq!(updated.name.as_deref(), Some("Renamed Buses"));
}

#[tokio::test]
async fn test_password_rotation_stamps_last_modified() {
    let database = common::test_database().await;
    let account = common::seed_account(&database, "alice", false).await;

    let updated = database
        .update_account_password(account.id, "n3w-s3cret")
        .await
        .unwrap();

    assert_ne!(updated.password_hash, account.password_hash);
    assert!(fleet_core::auth::verify_password(
        "n3w-s3cret",
        &updated.password_hash
    ));
}

#[tokio::test]
async fn test_vehicle_assignment_follows_referential_rules() {
    let database = common::test_database().await;
    let company = common::seed_company(&database, "ABCD", "ABC").await;

    let vehicle = common::seed_vehicle(&database, "47001", Some(company.id)).await;
    assert_eq!(vehicle.opco_id, Some(company.id));

    // Referencing a company that does not exist is rejected by the store.
    let error = database
        .create_vehicle(NewVehicle {
            fleet_no: "47002".into(),
            opco_id: Some(9999),
        })
        .await
        .unwrap_err();
    assert_eq!(error.kind, ErrorKind::Internal);

    // Duplicate fleet number is a conflict like any unique collision.
    let duplicate = database
        .create_vehicle(NewVehicle {
            fleet_no: "47001".into(),
            opco_id: None,
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn test_vehicle_reassignment_through_merge() {
    let database = common::test_database().await;
    let first = common::seed_company(&database, "ABCD", "ABC").await;
    let second = common::seed_company(&database, "WXYZ", "WXY").await;
    let vehicle = common::seed_vehicle(&database, "47001", Some(first.id)).await;

    let merged = vehicle
        .merged(VehiclePatch {
            opco_id: Some(second.id),
            ..VehiclePatch::default()
        })
        .unwrap();
    let updated = database.update_vehicle(&merged).await.unwrap();

    assert_eq!(updated.opco_id, Some(second.id));
    assert_eq!(
        database.get_vehicle("47001").await.unwrap().opco_id,
        Some(second.id)
    );
}

#[tokio::test]
async fn test_ping_answers_on_a_live_store() {
    let database = common::test_database().await;

    assert!(database.ping().await.is_ok());
}

#[tokio::test]
async fn test_file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}/fleet-test.db", dir.path().display());

    {
        let database = Database::new(&url, 5).await.unwrap();
        common::seed_company(&database, "ABCD", "ABC").await;
    }

    let reopened = Database::new(&url, 5).await.unwrap();
    let page = reopened
        .list_operating_companies(&ListParams::default())
        .await
        .unwrap();
    assert_eq!(page.meta.max, 1);
    assert_eq!(page.result[0].noc, "ABCD");
}
