// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Finsight API Server
//!
//! Serves user profiles, tax calculations, expense tracking and
//! AI-generated financial advice to the browser client.

use finsight::{
    config::Config,
    db::FirestoreDb,
    services::{AdviceService, GeminiClient, IdentityVerifier, MailService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Finsight API");

    // Open the profile store
    let db = FirestoreDb::from_config(&config).await?;

    let gemini = GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_model,
        config.gemini_api_key.clone(),
    )?;
    if !gemini.has_api_key() {
        tracing::warn!("GEMINI_API_KEY not set; advice requests will fail");
    }
    tracing::info!(model = %config.gemini_model, "Advice service initialized");
    let advice_service = AdviceService::new(gemini);

    let mail_service = MailService::new(&config)?;

    let identity_verifier = Arc::new(IdentityVerifier::new(&config)?);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        advice_service,
        mail_service,
        identity_verifier,
    });

    // Build router
    let app = finsight::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("finsight=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
