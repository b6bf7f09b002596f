// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tax calculator routes. Stateless; no session required.
//!
//! Inputs are validated here and never reach the engine when invalid.

use crate::error::{AppError, Result};
use crate::models::TaxRules;
use crate::services::tax::{
    calculate_advance_tax, calculate_hra, calculate_interest, calculate_tax_with,
    compare_regimes, AdvanceTaxSchedule, HraExemption, InterestResult, TaxComparison,
};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tax/slabs", get(get_slabs))
        .route("/api/tax/calculate", post(calculate))
        .route("/api/tax/hra", post(hra))
        .route("/api/tax/advance", post(advance))
        .route("/api/tax/interest", post(interest))
}

fn rules_for(fiscal_year: Option<&str>) -> Result<&'static TaxRules> {
    match fiscal_year.map(str::trim).filter(|fy| !fy.is_empty()) {
        None => Ok(TaxRules::current()),
        Some(fy) => TaxRules::for_year(fy)
            .ok_or_else(|| AppError::BadRequest(format!("Unsupported fiscal year: {fy}"))),
    }
}

/// Accept only finite, non-negative amounts.
fn require_amounts(values: &[f64], message: &str) -> Result<()> {
    if values.iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        Err(AppError::BadRequest(message.to_string()))
    }
}

// ─── Slabs ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlabsQuery {
    fiscal_year: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlabsResponse {
    rules: &'static TaxRules,
    supported_years: Vec<&'static str>,
}

async fn get_slabs(
    query: std::result::Result<Query<SlabsQuery>, QueryRejection>,
) -> Result<Json<SlabsResponse>> {
    let Query(query) = query?;
    let rules = rules_for(query.fiscal_year.as_deref())?;
    Ok(Json(SlabsResponse {
        rules,
        supported_years: TaxRules::supported_years(),
    }))
}

// ─── Calculators ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalculateRequest {
    income: f64,
    fiscal_year: Option<String>,
}

async fn calculate(
    body: std::result::Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<TaxComparison>> {
    let Json(request) = body
        .map_err(|_| AppError::BadRequest("Please enter a valid income amount".to_string()))?;
    require_amounts(&[request.income], "Please enter a valid income amount")?;

    let rules = rules_for(request.fiscal_year.as_deref())?;
    let comparison = compare_regimes(request.income, rules);

    tracing::debug!(
        fiscal_year = rules.fiscal_year,
        recommended = %comparison.recommended_regime,
        "Compared tax regimes"
    );

    Ok(Json(comparison))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HraRequest {
    basic_salary: f64,
    hra_received: f64,
    rent_paid: f64,
    #[serde(default)]
    is_metro: bool,
}

async fn hra(
    body: std::result::Result<Json<HraRequest>, JsonRejection>,
) -> Result<Json<HraExemption>> {
    let Json(r) = body?;
    require_amounts(
        &[r.basic_salary, r.hra_received, r.rent_paid],
        "Please enter valid salary, HRA and rent amounts",
    )?;
    Ok(Json(calculate_hra(
        r.basic_salary,
        r.hra_received,
        r.rent_paid,
        r.is_metro,
    )))
}

/// Either a precomputed annual tax, or an income to run through the engine first.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceRequest {
    annual_tax: Option<f64>,
    income: Option<f64>,
    regime: Option<crate::models::Regime>,
    fiscal_year: Option<String>,
}

async fn advance(
    body: std::result::Result<Json<AdvanceRequest>, JsonRejection>,
) -> Result<Json<AdvanceTaxSchedule>> {
    let Json(r) = body?;

    let annual_tax = match (r.annual_tax, r.income) {
        (Some(tax), _) => {
            require_amounts(&[tax], "Please enter a valid tax amount")?;
            tax
        }
        (None, Some(income)) => {
            require_amounts(&[income], "Please enter a valid income amount")?;
            let rules = rules_for(r.fiscal_year.as_deref())?;
            let regime = r.regime.unwrap_or(crate::models::Regime::New);
            calculate_tax_with(income, regime, rules).total
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either annualTax or income is required".to_string(),
            ))
        }
    };

    Ok(Json(calculate_advance_tax(annual_tax)))
}

#[derive(Deserialize)]
struct InterestRequest {
    principal: f64,
    rate: f64,
    time: f64,
}

async fn interest(
    body: std::result::Result<Json<InterestRequest>, JsonRejection>,
) -> Result<Json<InterestResult>> {
    let Json(r) = body?;
    require_amounts(
        &[r.principal, r.rate, r.time],
        "Please enter valid principal, rate and time",
    )?;
    Ok(Json(calculate_interest(r.principal, r.rate, r.time)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_for_defaults_to_current_year() {
        assert_eq!(rules_for(None).unwrap().fiscal_year, "2025-26");
        assert_eq!(rules_for(Some("  ")).unwrap().fiscal_year, "2025-26");
        assert!(matches!(
            rules_for(Some("1999-00")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn require_amounts_rejects_negative_and_non_finite() {
        assert!(require_amounts(&[0.0, 10.0], "bad").is_ok());
        assert!(require_amounts(&[-1.0], "bad").is_err());
        assert!(require_amounts(&[f64::NAN], "bad").is_err());
        assert!(require_amounts(&[f64::INFINITY], "bad").is_err());
    }
}
