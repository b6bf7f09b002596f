// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense tracker and dashboard routes for the signed-in user.
//! The session middleware is applied in routes/mod.rs.

use crate::error::Result;
use crate::middleware::Session;
use crate::models::Profile;
use crate::services::expenses::{
    self, Dashboard, ExpenseAdded, ExpenseSummary, NewExpense, CATEGORIES,
};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

/// Routes behind `require_session`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/expenses", post(add_expense))
        .route("/api/expenses/{id}", delete(delete_expense))
        .route("/api/expenses/summary", get(get_summary))
        .route("/api/dashboard", get(get_dashboard))
}

/// Routes that need no session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/expenses/categories", get(get_categories))
}

async fn add_expense(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    body: std::result::Result<Json<NewExpense>, JsonRejection>,
) -> Result<Json<ExpenseAdded>> {
    let Json(new) = body?;
    let added =
        expenses::add_expense(&state.db, &state.mail_service, &session.email, new).await?;
    Ok(Json(added))
}

async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Profile>> {
    let profile = expenses::delete_expense(&state.db, &session.email, &id).await?;
    Ok(Json(profile))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<ExpenseSummary>> {
    let profile = super::session_profile(&state, &session).await?;
    Ok(Json(expenses::summarize(&profile, Utc::now().date_naive())))
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Dashboard>> {
    let profile = super::session_profile(&state, &session).await?;
    Ok(Json(expenses::dashboard(&profile, Utc::now().date_naive())))
}

async fn get_categories() -> Json<[&'static str; 8]> {
    Json(CATEGORIES)
}
