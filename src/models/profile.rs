// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile model for storage and API.
//!
//! Field names are camelCase on the wire and in the document store so that
//! the browser client and stored documents share one shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

pub const DEFAULT_AGE: u32 = 22;
pub const DEFAULT_ANNUAL_INCOME: f64 = 100_000.0;
pub const DEFAULT_MONTHLY_EXPENSE: f64 = 20_000.0;
pub const DEFAULT_SAVINGS: f64 = 5_000.0;
pub const DEFAULT_INVESTMENT_HORIZON: f64 = 2.0;

/// Self-reported appetite for investment volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "Low",
            RiskTolerance::Medium => "Medium",
            RiskTolerance::High => "High",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single expense embedded in a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Store-assigned identifier; `None` until the expense is first written.
    /// Serialized as `_id`, which is the key the browser client filters on.
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Sign is not validated.
    pub amount: f64,
    /// Free text; the suggested categories are not enforced.
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
}

/// User profile stored in the `users` collection, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Identity key from the identity provider (also the document key)
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default = "default_age")]
    pub age: u32,
    #[serde(default = "default_annual_income")]
    pub annual_income: f64,
    #[serde(default = "default_monthly_expense")]
    pub monthly_expense: f64,
    #[serde(default = "default_savings")]
    pub savings: f64,
    /// Investment horizon in years
    #[serde(default = "default_investment_horizon")]
    pub investment_horizon: f64,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_assets: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<f64>,
    /// Newest first.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Set by the store on insert (RFC3339)
    #[serde(default)]
    pub created_at: String,
    /// Set by the store on every write (RFC3339)
    #[serde(default)]
    pub updated_at: String,
}

fn default_age() -> u32 {
    DEFAULT_AGE
}
fn default_annual_income() -> f64 {
    DEFAULT_ANNUAL_INCOME
}
fn default_monthly_expense() -> f64 {
    DEFAULT_MONTHLY_EXPENSE
}
fn default_savings() -> f64 {
    DEFAULT_SAVINGS
}
fn default_investment_horizon() -> f64 {
    DEFAULT_INVESTMENT_HORIZON
}

impl Profile {
    /// A fresh profile with defaults applied.
    pub fn new(email: String, name: String, picture: Option<String>, now: &str) -> Self {
        Self {
            email,
            name,
            picture,
            age: DEFAULT_AGE,
            annual_income: DEFAULT_ANNUAL_INCOME,
            monthly_expense: DEFAULT_MONTHLY_EXPENSE,
            savings: DEFAULT_SAVINGS,
            investment_horizon: DEFAULT_INVESTMENT_HORIZON,
            risk_tolerance: RiskTolerance::default(),
            financial_goal: None,
            preferred_assets: None,
            monthly_budget: None,
            expenses: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Give every expense that lacks one a fresh identifier.
    ///
    /// Existing identifiers are never rewritten, so an id stays stable for
    /// the life of the expense regardless of which write path stored it.
    pub fn assign_expense_ids(&mut self) {
        for expense in self.expenses.iter_mut().filter(|e| e.id.is_none()) {
            expense.id = Some(uuid::Uuid::new_v4().to_string());
        }
    }

    /// Sum of all expense amounts.
    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }
}

/// Fields accepted when creating a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProfile {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub email: Option<String>,
}

/// The allow-list of attributes a profile update may touch.
///
/// Any key not named here is dropped during deserialization and can never
/// reach the store.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    #[validate(range(min = 0.0, message = "annualIncome must be non-negative"))]
    pub annual_income: Option<f64>,
    #[validate(range(min = 0.0, message = "monthlyExpense must be non-negative"))]
    pub monthly_expense: Option<f64>,
    #[validate(range(min = 0.0, message = "savings must be non-negative"))]
    pub savings: Option<f64>,
    #[validate(range(min = 0.0, message = "investmentHorizon must be non-negative"))]
    pub investment_horizon: Option<f64>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub financial_goal: Option<String>,
    pub preferred_assets: Option<String>,
    pub expenses: Option<Vec<Expense>>,

    // Richer profile-form variant
    pub name: Option<String>,
    pub picture: Option<String>,
    #[validate(range(min = 0.0, message = "monthlyBudget must be non-negative"))]
    pub monthly_budget: Option<f64>,
}

impl ProfileUpdate {
    /// Merge the present fields into `profile`. Expenses replace the whole list.
    pub fn apply(self, profile: &mut Profile) {
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(v) = self.annual_income {
            profile.annual_income = v;
        }
        if let Some(v) = self.monthly_expense {
            profile.monthly_expense = v;
        }
        if let Some(v) = self.savings {
            profile.savings = v;
        }
        if let Some(v) = self.investment_horizon {
            profile.investment_horizon = v;
        }
        if let Some(v) = self.risk_tolerance {
            profile.risk_tolerance = v;
        }
        if let Some(v) = self.financial_goal {
            profile.financial_goal = Some(v);
        }
        if let Some(v) = self.preferred_assets {
            profile.preferred_assets = Some(v);
        }
        if let Some(v) = self.expenses {
            profile.expenses = v;
        }
        if let Some(v) = self.name.filter(|n| !n.trim().is_empty()) {
            profile.name = v;
        }
        if let Some(v) = self.picture {
            profile.picture = Some(v);
        }
        if let Some(v) = self.monthly_budget {
            profile.monthly_budget = Some(v);
        }
    }
}
