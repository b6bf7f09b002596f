// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it; otherwise they are skipped.

use chrono::NaiveDate;
use finsight::models::{Expense, NewProfile, ProfileUpdate, RiskTolerance};

mod common;
use common::test_db;

/// Generate a unique email for test isolation.
fn unique_email() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("user-{nanos}@example.com")
}

fn new_profile(email: &str, name: &str) -> NewProfile {
    NewProfile {
        name: Some(name.to_string()),
        picture: None,
        email: Some(email.to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_if_absent_is_idempotent() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    assert!(db.get_profile(&email).await.unwrap().is_none());

    let first = db
        .create_profile_if_absent(new_profile(&email, "First"))
        .await
        .unwrap();
    let second = db
        .create_profile_if_absent(new_profile(&email, "Second"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.name, "First");

    let fetched = db.get_profile(&email).await.unwrap().unwrap();
    assert_eq!(fetched.email, email);
    assert_eq!(fetched.age, 22);
}

#[tokio::test]
async fn test_update_round_trips_through_firestore() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();
    db.create_profile_if_absent(new_profile(&email, "Ada"))
        .await
        .unwrap();

    let update = ProfileUpdate {
        risk_tolerance: Some(RiskTolerance::Low),
        annual_income: Some(900_000.0),
        expenses: Some(vec![Expense {
            id: None,
            description: "Rent".to_string(),
            amount: 20_000.0,
            category: "Bills".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }]),
        ..Default::default()
    };
    let updated = db.update_profile(&email, update).await.unwrap().unwrap();
    let expense_id = updated.expenses[0].id.clone();
    assert!(expense_id.is_some());

    let fetched = db.get_profile(&email).await.unwrap().unwrap();
    assert_eq!(fetched.risk_tolerance, RiskTolerance::Low);
    assert_eq!(fetched.annual_income, 900_000.0);
    assert_eq!(fetched.expenses[0].id, expense_id);
    assert_eq!(fetched.created_at, updated.created_at);
}

#[tokio::test]
async fn test_update_missing_profile_returns_none() {
    require_emulator!();

    let db = test_db().await;
    let result = db
        .update_profile(&unique_email(), ProfileUpdate::default())
        .await
        .unwrap();
    assert!(result.is_none());
}
