// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tax engine: progressive income tax, cess, HRA exemption, advance-tax
//! installments and interest.
//!
//! All functions are pure and never fail. Callers validate that inputs are
//! finite and non-negative before calling (see `routes::tax`). Results are
//! not rounded.

use crate::models::tax::{Bracket, Regime, TaxRules};
use serde::Serialize;

/// Tax owed under one regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBreakdown {
    pub tax: f64,
    pub cess: f64,
    pub total: f64,
}

/// Side-by-side result for both regimes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxComparison {
    pub fiscal_year: &'static str,
    pub income: f64,
    pub old_regime: TaxBreakdown,
    pub new_regime: TaxBreakdown,
    /// Old total minus new total (negative when the old regime is cheaper)
    pub savings: f64,
    pub recommended_regime: Regime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HraExemption {
    pub exemption: f64,
    pub taxable_hra: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub quarter: u8,
    pub due_date: &'static str,
    /// Share of annual tax that must be paid by `due_date`, in percent
    pub cumulative_percent: f64,
    /// Amount payable this quarter (increment over the previous checkpoint)
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceTaxSchedule {
    pub annual_tax: f64,
    pub installments: Vec<Installment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestResult {
    pub simple_interest: f64,
    pub compound_interest: f64,
}

/// Cumulative advance-tax checkpoints: (due date, percent due by then).
const ADVANCE_TAX_CHECKPOINTS: [(&str, f64); 4] = [
    ("June 15", 15.0),
    ("September 15", 45.0),
    ("December 15", 75.0),
    ("March 15", 100.0),
];

const METRO_HRA_PERCENT: f64 = 50.0;
const NON_METRO_HRA_PERCENT: f64 = 40.0;
const HRA_RENT_THRESHOLD_PERCENT: f64 = 10.0;

/// Tax under the current fiscal year's rules.
pub fn calculate_tax(income: f64, regime: Regime) -> TaxBreakdown {
    calculate_tax_with(income, regime, TaxRules::current())
}

/// Tax under an explicit rule set.
///
/// No surcharge tier is applied.
pub fn calculate_tax_with(income: f64, regime: Regime, rules: &TaxRules) -> TaxBreakdown {
    let tax = bracket_tax(income, rules.brackets(regime));
    let cess = tax * rules.cess_percent / 100.0;
    TaxBreakdown {
        tax,
        cess,
        total: tax + cess,
    }
}

/// Marginal evaluation: base tax at the bracket's lower bound plus the rate
/// on the excess. The base is accumulated from the brackets below.
fn bracket_tax(income: f64, brackets: &[Bracket]) -> f64 {
    let mut base = 0.0;
    for bracket in brackets {
        match bracket.upper {
            Some(upper) if income > upper => {
                base += (upper - bracket.lower) * bracket.rate_percent / 100.0;
            }
            _ => {
                let excess = (income - bracket.lower).max(0.0);
                return base + excess * bracket.rate_percent / 100.0;
            }
        }
    }
    base
}

/// Evaluate both regimes and recommend the cheaper one (new on a tie).
pub fn compare_regimes(income: f64, rules: &'static TaxRules) -> TaxComparison {
    let old_regime = calculate_tax_with(income, Regime::Old, rules);
    let new_regime = calculate_tax_with(income, Regime::New, rules);
    let recommended_regime = if old_regime.total < new_regime.total {
        Regime::Old
    } else {
        Regime::New
    };

    TaxComparison {
        fiscal_year: rules.fiscal_year,
        income,
        old_regime,
        new_regime,
        savings: old_regime.total - new_regime.total,
        recommended_regime,
    }
}

/// HRA exemption: the least of HRA received, 50% (metro) or 40% of basic,
/// and rent paid in excess of 10% of basic (floored at zero).
pub fn calculate_hra(
    basic_salary: f64,
    hra_received: f64,
    rent_paid: f64,
    is_metro: bool,
) -> HraExemption {
    let salary_percent = if is_metro {
        METRO_HRA_PERCENT
    } else {
        NON_METRO_HRA_PERCENT
    };

    let by_received = hra_received;
    let by_salary = basic_salary * salary_percent / 100.0;
    let by_rent = (rent_paid - basic_salary * HRA_RENT_THRESHOLD_PERCENT / 100.0).max(0.0);

    let exemption = by_received.min(by_salary).min(by_rent);
    HraExemption {
        exemption,
        taxable_hra: hra_received - exemption,
    }
}

/// Split annual tax into four quarterly payments.
pub fn calculate_advance_tax(annual_tax: f64) -> AdvanceTaxSchedule {
    let last = ADVANCE_TAX_CHECKPOINTS.len() - 1;
    let mut previous = 0.0;
    let mut paid = 0.0;
    let installments = ADVANCE_TAX_CHECKPOINTS
        .iter()
        .enumerate()
        .map(|(index, &(due_date, cumulative_percent))| {
            let cumulative = annual_tax * cumulative_percent / 100.0;
            // The final installment is whatever is left, so the installments
            // always add back up to `annual_tax`.
            let amount = if index == last {
                annual_tax - paid
            } else {
                cumulative - previous
            };
            previous = cumulative;
            paid += amount;
            Installment {
                quarter: index as u8 + 1,
                due_date,
                cumulative_percent,
                amount,
            }
        })
        .collect();

    AdvanceTaxSchedule {
        annual_tax,
        installments,
    }
}

/// Simple and annually compounded interest.
pub fn calculate_interest(principal: f64, rate: f64, time: f64) -> InterestResult {
    InterestResult {
        simple_interest: principal * rate * time / 100.0,
        compound_interest: principal * (1.0 + rate / 100.0).powf(time) - principal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_income_owes_nothing() {
        for regime in Regime::ALL {
            let result = calculate_tax(0.0, regime);
            assert_eq!(
                result,
                TaxBreakdown {
                    tax: 0.0,
                    cess: 0.0,
                    total: 0.0
                }
            );
        }
    }

    #[test]
    fn twelve_lakh_new_regime() {
        let result = calculate_tax(1_200_000.0, Regime::New);
        assert_eq!(result.tax, 90_000.0);
        assert_eq!(result.cess, 3_600.0);
        assert_eq!(result.total, 93_600.0);
    }

    #[test]
    fn twelve_lakh_old_regime() {
        let result = calculate_tax(1_200_000.0, Regime::Old);
        assert_eq!(result.tax, 172_500.0);
        assert_eq!(result.cess, 6_900.0);
        assert_eq!(result.total, 179_400.0);
    }

    #[test]
    fn bracket_bases_match_published_schedule() {
        let expected_new = [
            (300_000.0, 0.0),
            (600_000.0, 15_000.0),
            (900_000.0, 45_000.0),
            (1_200_000.0, 90_000.0),
            (1_500_000.0, 150_000.0),
        ];
        for (income, tax) in expected_new {
            assert_eq!(calculate_tax(income, Regime::New).tax, tax, "new @ {income}");
        }

        let expected_old = [(250_000.0, 0.0), (500_000.0, 12_500.0), (1_000_000.0, 112_500.0)];
        for (income, tax) in expected_old {
            assert_eq!(calculate_tax(income, Regime::Old).tax, tax, "old @ {income}");
        }
    }

    #[test]
    fn tax_is_monotonic_and_cess_is_four_percent() {
        for regime in Regime::ALL {
            let mut previous = 0.0;
            let mut income = 0.0;
            while income <= 3_000_000.0 {
                let result = calculate_tax(income, regime);
                assert!(result.tax >= previous, "{regime} dips at {income}");
                assert_eq!(result.cess, result.tax * 4.0 / 100.0);
                assert_eq!(result.total, result.tax + result.cess);
                previous = result.tax;
                income += 2_500.0;
            }
        }
    }

    #[test]
    fn tax_is_continuous_at_boundaries() {
        let rules = TaxRules::current();
        for regime in Regime::ALL {
            for bracket in rules.brackets(regime) {
                let Some(upper) = bracket.upper else { continue };
                let at = calculate_tax(upper, regime).tax;
                let just_above = calculate_tax(upper + 0.01, regime).tax;
                assert!(just_above - at < 0.01, "{regime} jumps at {upper}");
            }
        }
    }

    #[test]
    fn comparison_recommends_cheaper_regime() {
        let comparison = compare_regimes(1_200_000.0, TaxRules::current());
        assert_eq!(comparison.recommended_regime, Regime::New);
        assert_eq!(comparison.savings, 179_400.0 - 93_600.0);

        // Equal totals fall through to the new regime.
        let comparison = compare_regimes(0.0, TaxRules::current());
        assert_eq!(comparison.recommended_regime, Regime::New);
        assert_eq!(comparison.savings, 0.0);
    }

    #[test]
    fn hra_metro_example() {
        let result = calculate_hra(500_000.0, 200_000.0, 150_000.0, true);
        assert_eq!(result.exemption, 100_000.0);
        assert_eq!(result.taxable_hra, 100_000.0);
    }

    #[test]
    fn hra_rent_below_threshold_exempts_nothing() {
        let result = calculate_hra(500_000.0, 200_000.0, 20_000.0, false);
        assert_eq!(result.exemption, 0.0);
        assert_eq!(result.taxable_hra, 200_000.0);
    }

    #[test]
    fn hra_non_metro_caps_at_forty_percent() {
        let result = calculate_hra(100_000.0, 90_000.0, 500_000.0, false);
        assert_eq!(result.exemption, 40_000.0);
        assert_eq!(result.taxable_hra, 50_000.0);
    }

    #[test]
    fn advance_tax_installments_are_incremental() {
        let schedule = calculate_advance_tax(100_000.0);
        let amounts: Vec<f64> = schedule.installments.iter().map(|i| i.amount).collect();
        assert_eq!(amounts, vec![15_000.0, 30_000.0, 30_000.0, 25_000.0]);

        let due: Vec<&str> = schedule.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(due, vec!["June 15", "September 15", "December 15", "March 15"]);

        assert_eq!(amounts.iter().sum::<f64>(), 100_000.0);
    }

    #[test]
    fn advance_tax_installments_sum_exactly_for_fractional_tax() {
        for annual_tax in [1.0 / 3.0, 0.1, 12_345.67, 98_765.4321, 1e-7, 7.0 / 9.0 * 1e6] {
            let schedule = calculate_advance_tax(annual_tax);
            let total: f64 = schedule.installments.iter().map(|i| i.amount).sum();
            assert_eq!(total, annual_tax, "installments of {annual_tax}");
            assert_eq!(schedule.installments[3].quarter, 4);
        }
    }

    #[test]
    fn interest_simple_and_compound() {
        let result = calculate_interest(10_000.0, 10.0, 2.0);
        assert_eq!(result.simple_interest, 2_000.0);
        assert!((result.compound_interest - 2_100.0).abs() < 1e-6);

        let none = calculate_interest(10_000.0, 0.0, 5.0);
        assert_eq!(none.simple_interest, 0.0);
        assert_eq!(none.compound_interest, 0.0);
    }
}
