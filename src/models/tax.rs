// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statutory tax rule tables, versioned by fiscal year.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two mutually exclusive bracket schedules a filer may choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Old,
    New,
}

impl Regime {
    pub const ALL: [Regime; 2] = [Regime::Old, Regime::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Old => "old",
            Regime::New => "new",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(Regime::Old),
            "new" => Ok(Regime::New),
            other => Err(format!("Unknown tax regime: {other}")),
        }
    }
}

/// A marginal-rate bracket. `upper` is `None` for the open top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    pub lower: f64,
    pub upper: Option<f64>,
    /// Marginal rate in percent (5.0 = 5%)
    pub rate_percent: f64,
}

const fn bracket(lower: f64, upper: Option<f64>, rate_percent: f64) -> Bracket {
    Bracket {
        lower,
        upper,
        rate_percent,
    }
}

/// Complete rule set for one fiscal year.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRules {
    /// Fiscal year label, e.g. "2025-26"
    pub fiscal_year: &'static str,
    pub old_regime: &'static [Bracket],
    pub new_regime: &'static [Bracket],
    /// Flat levy on computed tax, in percent
    pub cess_percent: f64,
}

// Brackets must be contiguous and ascending; the engine derives each
// bracket's base tax from the ones below it.
static FY_2025_26: TaxRules = TaxRules {
    fiscal_year: "2025-26",
    old_regime: &[
        bracket(0.0, Some(250_000.0), 0.0),
        bracket(250_000.0, Some(500_000.0), 5.0),
        bracket(500_000.0, Some(1_000_000.0), 20.0),
        bracket(1_000_000.0, None, 30.0),
    ],
    new_regime: &[
        bracket(0.0, Some(300_000.0), 0.0),
        bracket(300_000.0, Some(600_000.0), 5.0),
        bracket(600_000.0, Some(900_000.0), 10.0),
        bracket(900_000.0, Some(1_200_000.0), 15.0),
        bracket(1_200_000.0, Some(1_500_000.0), 20.0),
        bracket(1_500_000.0, None, 30.0),
    ],
    cess_percent: 4.0,
};

static ALL_RULES: &[&TaxRules] = &[&FY_2025_26];

impl TaxRules {
    /// Rules for the latest supported fiscal year.
    pub fn current() -> &'static TaxRules {
        &FY_2025_26
    }

    /// Look up rules by fiscal year label ("2025-26").
    pub fn for_year(fiscal_year: &str) -> Option<&'static TaxRules> {
        let wanted = fiscal_year.trim();
        ALL_RULES
            .iter()
            .copied()
            .find(|rules| rules.fiscal_year == wanted)
    }

    /// Every supported fiscal year, oldest first.
    pub fn supported_years() -> Vec<&'static str> {
        ALL_RULES.iter().map(|rules| rules.fiscal_year).collect()
    }

    pub fn brackets(&self, regime: Regime) -> &'static [Bracket] {
        match regime {
            Regime::Old => self.old_regime,
            Regime::New => self.new_regime,
        }
    }
}
