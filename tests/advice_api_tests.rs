// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Advice, plan and chat endpoint tests against a mock generative-language API.

use axum::http::StatusCode;
use finsight::config::Config;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{authed_request, create_test_app, create_test_app_with, read_json, seed_profile};

const EMAIL: &str = "ada@example.com";

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

fn config_for(server: &MockServer) -> Config {
    Config {
        gemini_base_url: server.uri(),
        gemini_model: "test-model".to_string(),
        gemini_api_key: Some("test-key".to_string()),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_advice_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/test-model:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("Focus Topic: Buying a house"))
        .respond_with(reply("Save 20% for the down payment."))
        .mount(&server)
        .await;

    let (app, state) = create_test_app_with(config_for(&server));
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/advice",
            &token,
            Some(json!({ "focus": "Buying a house" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["advice"], "Save 20% for the down payment.");
    assert!(body["risk"].is_string());
    assert!(body["profile"].as_str().unwrap().contains("Age: 22"));
}

#[tokio::test]
async fn test_advice_without_api_key_is_tagged_failure() {
    let (app, state) = create_test_app();
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request("POST", "/api/advice", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], false);
    assert!(body["error"].is_string());
    assert!(body.get("advice").is_none());
}

#[tokio::test]
async fn test_plan_tolerates_partial_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("tax regimes"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(reply("Section advice"))
        .with_priority(2)
        .mount(&server)
        .await;

    let (app, state) = create_test_app_with(config_for(&server));
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request("POST", "/api/advice/plan", &token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let sections = body["sections"].as_array().unwrap();
    let categories: Vec<&str> = sections
        .iter()
        .map(|s| s["category"].as_str().unwrap())
        .collect();
    assert_eq!(
        categories,
        vec![
            "Emergency Fund",
            "Investment Allocation",
            "Tax Saving",
            "Retirement"
        ]
    );
    assert_eq!(sections[0]["ok"], true);
    assert_eq!(sections[2]["ok"], false);
    assert_eq!(sections[3]["advice"], "Section advice");
}

#[tokio::test]
async fn test_chat_sends_history_and_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("systemInstruction"))
        .and(body_string_contains("Earlier question"))
        .and(body_string_contains("\"temperature\":0.1"))
        .respond_with(reply("Here is my answer."))
        .mount(&server)
        .await;

    let (app, state) = create_test_app_with(config_for(&server));
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/advice/chat",
            &token,
            Some(json!({
                "history": [
                    { "role": "user", "text": "Earlier question" },
                    { "role": "model", "text": "Earlier answer" }
                ],
                "message": "Should I buy gold?"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "ok": true, "reply": "Here is my answer." })
    );
}

#[tokio::test]
async fn test_chat_requires_message() {
    let (app, state) = create_test_app();
    seed_profile(&state, EMAIL).await;
    let token = common::session_token(&state, EMAIL);

    let response = app
        .oneshot(authed_request(
            "POST",
            "/api/advice/chat",
            &token,
            Some(json!({ "message": "   " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
