// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod profile;
pub mod tax;

pub use profile::{Expense, NewProfile, Profile, ProfileUpdate, RiskTolerance};
pub use tax::{Bracket, Regime, TaxRules};
