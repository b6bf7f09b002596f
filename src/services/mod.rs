// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod advice;
pub mod expenses;
pub mod gemini;
pub mod identity;
pub mod mail;
pub mod tax;

pub use advice::{AdviceOutcome, AdviceService, ChatOutcome};
pub use gemini::GeminiClient;
pub use identity::{IdentityError, IdentityVerifier, VerifiedIdentity};
pub use mail::{MailMessage, MailOutcome, MailService, MailTransport};
