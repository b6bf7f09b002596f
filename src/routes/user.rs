// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile CRUD routes keyed by email.

use crate::error::{AppError, Result};
use crate::models::{NewProfile, Profile, ProfileUpdate};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/create", post(create_user))
        .route("/api/user", get(get_user))
        .route("/api/user/update", post(update_user))
}

/// Create a profile, or return the existing one for that email.
async fn create_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<NewProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>)> {
    let Json(new) = body?;
    let profile = state.db.create_profile_if_absent(new).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Deserialize)]
struct EmailQuery {
    #[serde(default)]
    email: String,
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<Profile>> {
    let Query(query) = query?;
    let profile = state
        .db
        .get_profile(&query.email)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(Json(profile))
}

/// `{email, ...fields}`; fields outside the allow-list are dropped.
#[derive(Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    email: String,
    #[serde(flatten)]
    update: ProfileUpdate,
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Profile>> {
    let Json(request) = body?;
    let profile = state
        .db
        .update_profile(&request.email, request.update)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    Ok(Json(profile))
}
