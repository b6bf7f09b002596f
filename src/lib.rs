// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Finsight: personal-finance backend.
//!
//! This crate provides the profile API, the tax calculator, expense
//! tracking with budget alerts, and AI-generated financial advice for the
//! browser client.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod money;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{AdviceService, IdentityVerifier, MailService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub advice_service: AdviceService,
    pub mail_service: MailService,
    pub identity_verifier: Arc<IdentityVerifier>,
}
