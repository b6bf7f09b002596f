// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Expense tracker: list mutations, summary views and the budget alert.
//!
//! Every mutation rewrites the profile's full expense list through the
//! store. Nothing here holds state between requests.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Expense, Profile, ProfileUpdate};
use crate::money::{format_amount, percentage_of};
use crate::services::mail::{MailMessage, MailService};
use crate::time_utils::same_month;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Suggested categories offered to the client. Not enforced.
pub const CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Healthcare",
    "Education",
    "Other",
];

/// Cumulative spend, as a percent of annual income, above which an alert is mailed.
pub const BUDGET_ALERT_PERCENT: f64 = 50.0;

/// Monthly budget usage above which the dashboard flags a warning.
pub const BUDGET_WARNING_PERCENT: f64 = 80.0;

/// Expense as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

impl NewExpense {
    fn into_expense(self, today: NaiveDate) -> Expense {
        Expense {
            id: None,
            description: self.description.trim().to_string(),
            amount: self.amount,
            category: self.category.trim().to_string(),
            date: self.date.unwrap_or(today),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseAdded {
    pub profile: Profile,
    pub budget_percentage: f64,
    pub alert_triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total: f64,
    pub count: usize,
    pub current_month_total: f64,
    /// Largest first
    pub by_category: Vec<CategoryTotal>,
    /// Total expenses as a percent of annual income
    pub budget_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub monthly_budget: f64,
    pub spent_this_month: f64,
    pub remaining: f64,
    pub usage_percentage: f64,
    pub warning: bool,
}

/// Prepend `new` to the profile's expenses and store the full list.
///
/// When cumulative spend crosses the alert threshold, a budget alert is
/// handed to the mail gateway on a background task; the response does not
/// wait for it and a failed send is only logged.
pub async fn add_expense(
    db: &FirestoreDb,
    mail: &MailService,
    email: &str,
    new: NewExpense,
) -> Result<ExpenseAdded, AppError> {
    if !new.amount.is_finite() {
        return Err(AppError::BadRequest(
            "Please enter a valid expense amount".to_string(),
        ));
    }

    let current = db
        .get_profile(email)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let today = Utc::now().date_naive();
    let mut expenses = Vec::with_capacity(current.expenses.len() + 1);
    expenses.push(new.into_expense(today));
    expenses.extend(current.expenses);

    let profile = replace_expenses(db, email, expenses).await?;

    let budget_percentage = percentage_of(profile.total_expenses(), profile.annual_income);
    let alert_triggered = budget_percentage > BUDGET_ALERT_PERCENT;

    tracing::info!(
        email,
        count = profile.expenses.len(),
        budget_percentage,
        "Added expense"
    );

    if alert_triggered {
        let message = budget_alert_message(&profile, budget_percentage);
        let mail = mail.clone();
        tokio::spawn(async move {
            match mail.send(&message).await {
                outcome if outcome.is_sent() => {
                    tracing::info!(to = %message.to, "Budget alert sent");
                }
                outcome => {
                    tracing::warn!(to = %message.to, outcome = ?outcome, "Budget alert not sent");
                }
            }
        });
    }

    Ok(ExpenseAdded {
        profile,
        budget_percentage,
        alert_triggered,
    })
}

/// Remove the expense with `id`. An unknown id leaves the list unchanged.
pub async fn delete_expense(db: &FirestoreDb, email: &str, id: &str) -> Result<Profile, AppError> {
    let current = db
        .get_profile(email)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let before = current.expenses.len();
    let expenses: Vec<Expense> = current
        .expenses
        .into_iter()
        .filter(|e| e.id.as_deref() != Some(id))
        .collect();

    if expenses.len() == before {
        tracing::debug!(email, id, "No expense matched for delete");
    }

    replace_expenses(db, email, expenses).await
}

async fn replace_expenses(
    db: &FirestoreDb,
    email: &str,
    expenses: Vec<Expense>,
) -> Result<Profile, AppError> {
    let update = ProfileUpdate {
        expenses: Some(expenses),
        ..Default::default()
    };
    db.update_profile(email, update)
        .await?
        .ok_or_else(AppError::user_not_found)
}

pub fn summarize(profile: &Profile, today: NaiveDate) -> ExpenseSummary {
    let total = profile.total_expenses();

    let current_month_total = profile
        .expenses
        .iter()
        .filter(|e| same_month(e.date, today))
        .map(|e| e.amount)
        .sum();

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for expense in &profile.expenses {
        *totals.entry(expense.category.as_str()).or_default() += expense.amount;
    }
    let mut by_category: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    by_category.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    ExpenseSummary {
        total,
        count: profile.expenses.len(),
        current_month_total,
        by_category,
        budget_percentage: percentage_of(total, profile.annual_income),
    }
}

/// Monthly budget view. The budget is the profile's own monthly budget when
/// set, otherwise one twelfth of annual income.
pub fn dashboard(profile: &Profile, today: NaiveDate) -> Dashboard {
    let monthly_budget = profile
        .monthly_budget
        .filter(|b| *b > 0.0)
        .unwrap_or(profile.annual_income / 12.0);

    let spent_this_month: f64 = profile
        .expenses
        .iter()
        .filter(|e| same_month(e.date, today))
        .map(|e| e.amount)
        .sum();

    let usage_percentage = percentage_of(spent_this_month, monthly_budget);

    Dashboard {
        monthly_budget,
        spent_this_month,
        remaining: monthly_budget - spent_this_month,
        usage_percentage,
        warning: usage_percentage > BUDGET_WARNING_PERCENT,
    }
}

pub fn budget_alert_message(profile: &Profile, budget_percentage: f64) -> MailMessage {
    let name = if profile.name.trim().is_empty() {
        "User"
    } else {
        profile.name.trim()
    };

    let html = format!(
        "<h2>⚠️ Budget Alert</h2>\
         <p>Hi {},</p>\
         <p>You've spent <strong>{:.2}%</strong> of your Annual Income (₹{}), \
         which exceeds the safe threshold.</p>\
         <p>Please consider reviewing your spending habits.</p>\
         <p>- Your Finance Tracker</p>",
        escape_html(name),
        budget_percentage,
        format_amount(profile.annual_income),
    );

    MailMessage {
        to: profile.email.clone(),
        subject: "Budget Alert: You're spending over 50% of your income!".to_string(),
        html,
        bcc: Vec::new(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
