// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile store with typed operations.
//!
//! Every profile is one document in the `users` collection whose document ID
//! is the (URL-encoded) email, which makes email unique by construction.
//! Writes are whole-document replacements: the last writer wins, and no
//! version check is made.
//!
//! Two backends share one API:
//! - Firestore (production, or the emulator via `FIRESTORE_EMULATOR_HOST`)
//! - an in-process map, used by tests and `PROFILE_STORE=memory`

use crate::config::{Config, StoreBackend};
use crate::db::collections;
use crate::error::AppError;
use crate::models::{NewProfile, Profile, ProfileUpdate};
use crate::time_utils::now_rfc3339;
use dashmap::DashMap;
use std::sync::Arc;
use validator::Validate;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<DashMap<String, Profile>>),
}

/// Profile store client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Open the backend selected in configuration.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Firestore => Self::new(&config.gcp_project_id).await,
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory profile store; data is lost on restart");
                Ok(Self::new_in_memory())
            }
        }
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create an in-memory store (tests and local runs).
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Return the profile for `new.email`, inserting one with defaults if absent.
    ///
    /// An existing profile is returned unchanged; the supplied name and
    /// picture only seed a new record.
    pub async fn create_profile_if_absent(&self, new: NewProfile) -> Result<Profile, AppError> {
        let name = new.name.as_deref().map(str::trim).unwrap_or_default();
        let email = new.email.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || email.is_empty() {
            return Err(AppError::BadRequest(
                "Name and email are required".to_string(),
            ));
        }

        let now = now_rfc3339();
        let fresh = Profile::new(email.to_string(), name.to_string(), new.picture, &now);

        match &self.backend {
            Backend::Memory(map) => {
                let profile = map
                    .entry(email.to_string())
                    .or_insert_with(|| {
                        tracing::info!(email, "Created profile");
                        fresh
                    })
                    .clone();
                Ok(profile)
            }
            Backend::Firestore(client) => {
                if let Some(existing) = self.get_profile(email).await? {
                    return Ok(existing);
                }

                let inserted: Result<(), _> = client
                    .fluent()
                    .insert()
                    .into(collections::USERS)
                    .document_id(document_id(email))
                    .object(&fresh)
                    .execute()
                    .await;

                match inserted {
                    Ok(()) => {
                        tracing::info!(email, "Created profile");
                        Ok(fresh)
                    }
                    Err(e) => {
                        // Lost a race with a concurrent create for the same email.
                        if let Some(existing) = self.get_profile(email).await? {
                            tracing::debug!(email, "Profile created concurrently");
                            return Ok(existing);
                        }
                        Err(AppError::Database(e.to_string()))
                    }
                }
            }
        }
    }

    /// Get a profile by email.
    pub async fn get_profile(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let email = require_email(email)?;

        match &self.backend {
            Backend::Memory(map) => Ok(map.get(email).map(|entry| entry.value().clone())),
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(&document_id(email))
                .await
                .map_err(|e| AppError::Database(e.to_string())),
        }
    }

    /// Merge an allow-listed update into the profile for `email`.
    ///
    /// Returns the post-update profile, or `None` if no profile matched.
    pub async fn update_profile(
        &self,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<Option<Profile>, AppError> {
        let email = require_email(email)?;
        update.validate()?;

        let now = now_rfc3339();

        match &self.backend {
            Backend::Memory(map) => {
                let Some(mut entry) = map.get_mut(email) else {
                    return Ok(None);
                };
                let profile = entry.value_mut();
                update.apply(profile);
                profile.assign_expense_ids();
                profile.updated_at = now;
                tracing::debug!(email, "Updated profile");
                Ok(Some(profile.clone()))
            }
            Backend::Firestore(_) => {
                let Some(mut profile) = self.get_profile(email).await? else {
                    return Ok(None);
                };
                update.apply(&mut profile);
                profile.assign_expense_ids();
                profile.updated_at = now;
                self.put_profile(&profile).await?;
                tracing::debug!(email, "Updated profile");
                Ok(Some(profile))
            }
        }
    }

    /// Replace the whole stored document for `profile.email`.
    async fn put_profile(&self, profile: &Profile) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.insert(profile.email.clone(), profile.clone());
                Ok(())
            }
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(document_id(&profile.email))
                    .object(profile)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
        }
    }
}

fn require_email(email: &str) -> Result<&str, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    Ok(email)
}

/// Firestore document IDs may not contain `/`.
fn document_id(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}
