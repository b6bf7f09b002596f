// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Third-party credentials are optional: when the mail or generative-language
//! credentials are missing, the corresponding gateway reports a failure
//! outcome per request instead of refusing to start.

use std::env;
use std::str::FromStr;

/// Which persistence backend holds profile documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("PROFILE_STORE", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Server port
    pub port: u16,
    /// GCP project holding the Firestore profile collection
    pub gcp_project_id: String,
    /// Profile store backend
    pub store_backend: StoreBackend,
    /// Public base URL of the browser client (CORS, links in mail)
    pub frontend_url: String,
    /// Public base URL of this API
    pub api_url: String,
    /// OAuth client ID issued by the identity provider (ID token audience)
    pub identity_client_id: String,
    /// Generative-language model name
    pub gemini_model: String,
    /// Generative-language API base URL
    pub gemini_base_url: String,
    /// SMTP relay host for outbound mail
    pub mail_smtp_host: String,
    /// SMTP port; the relay's implicit-TLS port when unset
    pub mail_smtp_port: Option<u16>,
    /// Sender address for outbound mail
    pub mail_sender_address: Option<String>,

    // --- Secrets ---
    /// App password for the mail account
    pub mail_app_password: Option<String>,
    /// Generative-language API key
    pub gemini_api_key: Option<String>,
    /// HMAC key for session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            frontend_url: "http://localhost:5173".to_string(),
            api_url: "http://localhost:8080".to_string(),
            identity_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            mail_smtp_host: DEFAULT_MAIL_SMTP_HOST.to_string(),
            mail_smtp_port: None,
            mail_sender_address: None,
            mail_app_password: None,
            gemini_api_key: None,
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }
}

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MAIL_SMTP_HOST: &str = "smtp.gmail.com";

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        let store_backend = match env::var("PROFILE_STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Firestore,
        };

        let mail_smtp_port = match optional_var("MAIL_SMTP_PORT") {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| ConfigError::Invalid("MAIL_SMTP_PORT", raw))?,
            ),
            None => None,
        };

        Ok(Self {
            port,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_backend,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            api_url: env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            identity_client_id: env::var("IDENTITY_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_CLIENT_ID"))?,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            mail_smtp_host: optional_var("MAIL_SMTP_HOST")
                .unwrap_or_else(|| DEFAULT_MAIL_SMTP_HOST.to_string()),
            mail_smtp_port,
            mail_sender_address: optional_var("MAIL_SENDER_ADDRESS"),

            mail_app_password: optional_var("MAIL_APP_PASSWORD"),
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Read an env var, treating unset and blank the same.
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
