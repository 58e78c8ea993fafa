// ABOUTME: Integration tests for the two-phase confirmed-delete protocol
// ABOUTME: Covers preview rollback, confirmed commit, and referential-integrity conflicts
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use fleet_core::constants::messages;
use fleet_core::errors::ErrorKind;
use fleet_core::pagination::ListParams;

#[tokio::test]
async fn test_preview_reports_rows_and_leaves_store_unchanged() {
    let database = common::test_database().await;
    let company = common::seed_company(&database, "ABCD", "ABC").await;

    let report = database
        .delete_operating_company(company.id, false)
        .await
        .unwrap();

    assert_eq!(report.length, 1);
    assert_eq!(report.rows[0], company);
    assert!(report.message.contains("not confirmed"));

    // The preview rolled back; the row is still there.
    assert!(database.get_operating_company(company.id).await.is_ok());
}

#[tokio::test]
async fn test_confirmed_delete_commits_and_subsequent_reads_miss() {
    let database = common::test_database().await;
    let company = common::seed_company(&database, "ABCD", "ABC").await;

    let report = database
        .delete_operating_company(company.id, true)
        .await
        .unwrap();
    assert_eq!(report.length, 1);

    let error = database
        .get_operating_company(company.id)
        .await
        .unwrap_err();
    assert_eq!(error.kind, ErrorKind::NotFound);
    assert_eq!(
        database
            .list_operating_companies(&ListParams::default())
            .await
            .unwrap()
            .meta
            .max,
        0
    );
}

#[tokio::test]
async fn test_zero_affected_rows_is_not_found_in_both_phases() {
    let database = common::test_database().await;

    let preview = database
        .delete_operating_company(9999, false)
        .await
        .unwrap_err();
    let confirmed = database
        .delete_operating_company(9999, true)
        .await
        .unwrap_err();

    assert_eq!(preview.kind, ErrorKind::NotFound);
    assert_eq!(confirmed.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_company_in_use_is_a_distinct_conflict() {
    let database = common::test_database().await;
    let company = common::seed_company(&database, "ABCD", "ABC").await;
    common::seed_vehicle(&database, "47001", Some(company.id)).await;
    common::seed_vehicle(&database, "47002", Some(company.id)).await;

    let preview = database
        .delete_operating_company(company.id, false)
        .await
        .unwrap_err();
    let confirmed = database
        .delete_operating_company(company.id, true)
        .await
        .unwrap_err();

    // "Can't delete, in use" must be tellable from a uniqueness conflict
    // and from "did not exist".
    assert_eq!(preview.kind, ErrorKind::Conflict);
    assert_eq!(confirmed.kind, ErrorKind::Conflict);
    assert_eq!(preview.message, messages::MSG_COMPANY_IN_USE);
    assert_ne!(preview.message, messages::MSG_DUPLICATE_UNIQUE_FIELD);

    // Company and both vehicles survived.
    assert!(database.get_operating_company(company.id).await.is_ok());
    assert!(database.get_vehicle("47001").await.is_ok());
    assert!(database.get_vehicle("47002").await.is_ok());
}

#[tokio::test]
async fn test_delete_unblocks_once_vehicles_are_reassigned() {
    let database = common::test_database().await;
    let blocked = common::seed_company(&database, "ABCD", "ABC").await;
    let haven = common::seed_company(&database, "WXYZ", "WXY").await;
    let vehicle = common::seed_vehicle(&database, "47001", Some(blocked.id)).await;

    assert_eq!(
        database
            .delete_operating_company(blocked.id, true)
            .await
            .unwrap_err()
            .kind,
        ErrorKind::Conflict
    );

    let moved = fleet_core::models::Vehicle {
        opco_id: Some(haven.id),
        ..vehicle
    };
    database.update_vehicle(&moved).await.unwrap();

    assert!(database
        .delete_operating_company(blocked.id, true)
        .await
        .is_ok());
}
