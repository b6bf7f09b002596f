// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense tracker, dashboard and budget alert tests.

use axum::http::StatusCode;
use chrono::Utc;
use lettre::address::Envelope;
use lettre::transport::stub::AsyncStubTransport;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

mod common;
use common::{
    authed_request, create_test_app, create_test_app_with_outbox, read_json, seed_profile,
};

const EMAIL: &str = "ada@example.com";

fn today() -> String {
    Utc::now().date_naive().to_string()
}

fn expense(amount: f64) -> serde_json::Value {
    json!({
        "description": "Groceries",
        "amount": amount,
        "category": "Food",
        "date": today()
    })
}

/// Wait for the background alert task to reach the outbox.
async fn wait_for_outbox(outbox: &AsyncStubTransport, expected: usize) -> Vec<(Envelope, String)> {
    for _ in 0..50 {
        let sent = outbox.messages().await;
        if sent.len() >= expected {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    outbox.messages().await
}

#[tokio::test]
async fn test_add_and_delete_expense() {
    let (app, state) = create_test_app();
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/expenses", &token, Some(expense(500.0))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/expenses", &token, Some(expense(700.0))))
        .await
        .unwrap();
    let body = read_json(response).await;

    let expenses = body["profile"]["expenses"].as_array().unwrap().clone();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0]["amount"], 700.0);
    assert_eq!(body["budgetPercentage"], 1.2);
    assert_eq!(body["alertTriggered"], false);

    let older_id = expenses[1]["_id"].as_str().unwrap().to_string();
    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/expenses/{older_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let remaining = body["expenses"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["amount"], 700.0);
}

#[tokio::test]
async fn test_add_expense_rejects_bad_body() {
    let (app, state) = create_test_app();
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/expenses",
            &token,
            Some(json!({ "description": "Taxi", "amount": "a lot" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_and_dashboard() {
    let (app, state) = create_test_app();
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let old = json!({
        "description": "Rent",
        "amount": 3000,
        "category": "Bills",
        "date": "2001-01-01"
    });
    for body in [old, expense(6000.0), expense(2500.0)] {
        let response = app
            .clone()
            .oneshot(authed_request("POST", "/api/expenses", &token, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/expenses/summary", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = read_json(response).await;
    assert_eq!(summary["total"], 11500.0);
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["currentMonthTotal"], 8500.0);
    assert_eq!(summary["byCategory"][0], json!({ "category": "Food", "total": 8500.0 }));
    assert_eq!(summary["byCategory"][1]["category"], "Bills");

    // Default income is 100000, so the monthly budget is a twelfth of it.
    let response = app
        .oneshot(authed_request("GET", "/api/dashboard", &token, None))
        .await
        .unwrap();
    let dashboard = read_json(response).await;
    let budget = dashboard["monthlyBudget"].as_f64().unwrap();
    assert!((budget - 100000.0 / 12.0).abs() < 1e-9);
    assert_eq!(dashboard["spentThisMonth"], 8500.0);
    assert_eq!(dashboard["warning"], true);
}

#[tokio::test]
async fn test_categories_are_public() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/api/expenses/categories")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 8);
    assert_eq!(body[0], "Food");
}

#[tokio::test]
async fn test_budget_alert_mail_sent_over_threshold() {
    let outbox = Arc::new(AsyncStubTransport::new_ok());
    let (app, state) = create_test_app_with_outbox(&outbox);
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    // Under the threshold: no mail
    let response = app
        .clone()
        .oneshot(authed_request("POST", "/api/expenses", &token, Some(expense(40000.0))))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["alertTriggered"], false);

    // 40000 + 20000 = 60% of 100000
    let response = app
        .oneshot(authed_request("POST", "/api/expenses", &token, Some(expense(20000.0))))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["alertTriggered"], true);
    assert_eq!(body["budgetPercentage"], 60.0);

    let sent = wait_for_outbox(&outbox, 1).await;
    assert_eq!(sent.len(), 1);
    let (envelope, raw) = &sent[0];
    let recipients: Vec<String> = envelope.to().iter().map(ToString::to_string).collect();
    assert_eq!(recipients, vec![EMAIL.to_string()]);
    assert!(raw.contains("Subject: Budget Alert"));
}

#[tokio::test]
async fn test_budget_alert_failure_does_not_fail_request() {
    let outbox = Arc::new(AsyncStubTransport::new_error());
    let (app, state) = create_test_app_with_outbox(&outbox);
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request("POST", "/api/expenses", &token, Some(expense(90000.0))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["alertTriggered"], true);
}
