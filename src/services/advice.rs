// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Advice gateway: turns a profile into a prompt for the generative-language
//! API and returns the generated advice with a locally computed risk label.
//!
//! Nothing here returns `Err` to the caller. Upstream failures (missing key,
//! network, HTTP status, empty output) become a tagged failure value.

use crate::models::Profile;
use crate::money::format_amount;
use crate::services::gemini::{ChatTurn, GeminiClient, GenerateRequest};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;

const DEFAULT_FINANCIAL_GOAL: &str = "Wealth Growth";
const DEFAULT_PREFERRED_ASSETS: &str = "Mutual Funds, Gold";
const CHAT_TEMPERATURE: f32 = 0.1;
const CHAT_UNAVAILABLE: &str =
    "I'm sorry, I can't connect to my services right now. Please check the API configuration.";

const ADVICE_INSTRUCTION: &str = "\
You are a certified financial advisor. Using the user profile below, write 10-15 lines of \
personalized, actionable financial advice in markdown. Cover:

- Recommended asset types (for example mutual funds, stocks, bonds, gold, real estate)
- A suggested allocation in percent (for example 40% mutual funds, 30% stocks)
- The reasoning behind each choice, tied to the profile
- Practical, beginner-friendly steps
- Do not repeat the user profile in the response";

// ─── Risk Scoring ────────────────────────────────────────────

/// System-assessed risk appetite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    /// Always within 4..=12
    pub score: u8,
    pub level: RiskLevel,
}

/// Score risk from profile facts, independent of what the user reported
/// except for the final tolerance term.
pub fn assess_risk(
    age: u32,
    annual_income: f64,
    monthly_expense: f64,
    savings: f64,
    tolerance: &str,
) -> RiskAssessment {
    let mut score: u8 = match age {
        a if a < 30 => 3,
        a if a < 50 => 2,
        _ => 1,
    };

    let monthly_income = annual_income / 12.0;
    let expense_ratio = if monthly_income != 0.0 {
        monthly_expense / monthly_income
    } else {
        1.0
    };
    score += if expense_ratio < 0.5 {
        3
    } else if expense_ratio < 0.75 {
        2
    } else {
        1
    };

    score += if savings > annual_income * 2.0 {
        3
    } else if savings > annual_income {
        2
    } else {
        1
    };

    score += match tolerance.trim().to_ascii_lowercase().as_str() {
        "low" => 1,
        "medium" => 2,
        "high" => 3,
        _ => 2,
    };

    let level = if score >= 10 {
        RiskLevel::High
    } else if score >= 7 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment { score, level }
}

// ─── Prompt Assembly ─────────────────────────────────────────

/// Profile fields that feed an advice prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceParams {
    pub age: u32,
    pub annual_income: f64,
    pub monthly_expense: f64,
    pub savings: f64,
    pub investment_horizon: f64,
    pub risk_tolerance: String,
    pub financial_goal: String,
    pub preferred_assets: String,
}

impl From<&Profile> for AdviceParams {
    fn from(profile: &Profile) -> Self {
        Self {
            age: profile.age,
            annual_income: profile.annual_income,
            monthly_expense: profile.monthly_expense,
            savings: profile.savings,
            investment_horizon: profile.investment_horizon,
            risk_tolerance: profile.risk_tolerance.to_string(),
            financial_goal: non_blank(profile.financial_goal.as_deref())
                .unwrap_or(DEFAULT_FINANCIAL_GOAL)
                .to_string(),
            preferred_assets: non_blank(profile.preferred_assets.as_deref())
                .unwrap_or(DEFAULT_PREFERRED_ASSETS)
                .to_string(),
        }
    }
}

impl AdviceParams {
    pub fn assess_risk(&self) -> RiskAssessment {
        assess_risk(
            self.age,
            self.annual_income,
            self.monthly_expense,
            self.savings,
            &self.risk_tolerance,
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Human-readable profile summary included in the prompt and the response.
pub fn format_profile(params: &AdviceParams, risk: RiskLevel) -> String {
    format!(
        "User Profile:\n\
         - Age: {}\n\
         - Annual Income: ₹{}\n\
         - Monthly Expense: ₹{}\n\
         - Total Savings: ₹{}\n\
         - Investment Horizon: {} years\n\
         - Financial Goal: {}\n\
         - Preferred Assets: {}\n\
         - Self-assessed Risk Tolerance: {}\n\
         - AI-assessed Risk Profile: {}",
        params.age,
        format_amount(params.annual_income),
        format_amount(params.monthly_expense),
        format_amount(params.savings),
        params.investment_horizon,
        params.financial_goal,
        params.preferred_assets,
        params.risk_tolerance,
        risk,
    )
}

/// Instruction, then profile, then the optional focus topic.
pub fn build_prompt(profile_summary: &str, focus: Option<&str>) -> String {
    let mut prompt = format!("{ADVICE_INSTRUCTION}\n\n{profile_summary}");
    if let Some(focus) = non_blank(focus) {
        prompt.push_str("\n\nFocus Topic: ");
        prompt.push_str(focus);
    }
    prompt
}

fn chat_instruction(profile: &Profile) -> String {
    format!(
        "You are FinanceAI, a finance expert assistant. Give structured, professional \
         answers anchored in the user's situation, combining fundamental, technical and \
         macroeconomic views, and suggest hedges where uncertainty is high. Keep each \
         section between 30 and 70 words. Be transparent when data is limited.\n\n\
         USER CONTEXT:\n\
         - Name: {}\n\
         - Age: {}\n\
         - Annual Income: ₹{}\n\
         - Focus: Medium-term (6-month outlook with quarterly checkpoints)",
        profile.name,
        profile.age,
        format_amount(profile.annual_income),
    )
}

// ─── Outcomes ────────────────────────────────────────────────

/// Result of one advice generation: `{ok: true, advice, risk, profile}` or
/// `{ok: false, error}` on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum AdviceOutcome {
    Success {
        advice: String,
        risk: RiskLevel,
        profile: String,
    },
    Failure {
        error: String,
    },
}

impl AdviceOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, AdviceOutcome::Success { .. })
    }
}

impl Serialize for AdviceOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AdviceOutcome::Success {
                advice,
                risk,
                profile,
            } => {
                let mut s = serializer.serialize_struct("AdviceOutcome", 4)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("advice", advice)?;
                s.serialize_field("risk", risk)?;
                s.serialize_field("profile", profile)?;
                s.end()
            }
            AdviceOutcome::Failure { error } => {
                let mut s = serializer.serialize_struct("AdviceOutcome", 2)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

/// Result of one chat turn: `{ok: true, reply}` or `{ok: false, error}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Reply(String),
    Failure(String),
}

impl Serialize for ChatOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ChatOutcome", 2)?;
        match self {
            ChatOutcome::Reply(reply) => {
                s.serialize_field("ok", &true)?;
                s.serialize_field("reply", reply)?;
            }
            ChatOutcome::Failure(error) => {
                s.serialize_field("ok", &false)?;
                s.serialize_field("error", error)?;
            }
        }
        s.end()
    }
}

/// Areas covered by a full plan, in response order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanCategory {
    #[serde(rename = "Emergency Fund")]
    EmergencyFund,
    #[serde(rename = "Investment Allocation")]
    InvestmentAllocation,
    #[serde(rename = "Tax Saving")]
    TaxSaving,
    #[serde(rename = "Retirement")]
    Retirement,
}

impl PlanCategory {
    pub const ALL: [PlanCategory; 4] = [
        PlanCategory::EmergencyFund,
        PlanCategory::InvestmentAllocation,
        PlanCategory::TaxSaving,
        PlanCategory::Retirement,
    ];

    fn focus(&self) -> &'static str {
        match self {
            PlanCategory::EmergencyFund => {
                "Sizing an emergency fund in months of expenses and where to keep it"
            }
            PlanCategory::InvestmentAllocation => {
                "Allocating across the preferred assets for the stated investment horizon"
            }
            PlanCategory::TaxSaving => {
                "Tax-saving investments and choosing between the old and new tax regimes"
            }
            PlanCategory::Retirement => {
                "Long-term retirement planning through systematic investing"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSection {
    pub category: PlanCategory,
    #[serde(flatten)]
    pub outcome: AdviceOutcome,
}

// ─── Service ─────────────────────────────────────────────────

/// Advice gateway over the generative-language client.
#[derive(Clone)]
pub struct AdviceService {
    gemini: GeminiClient,
}

impl AdviceService {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Generate advice for one profile, optionally steered by a focus topic.
    pub async fn advise(&self, params: &AdviceParams, focus: Option<&str>) -> AdviceOutcome {
        let risk = params.assess_risk();
        let profile = format_profile(params, risk.level);
        let prompt = build_prompt(&profile, focus);

        match self.gemini.generate(GenerateRequest::prompt(prompt)).await {
            Ok(advice) => {
                tracing::info!(risk = %risk.level, score = risk.score, "Generated advice");
                AdviceOutcome::Success {
                    advice,
                    risk: risk.level,
                    profile,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Advice generation failed");
                AdviceOutcome::Failure {
                    error: e.to_string(),
                }
            }
        }
    }

    /// One generation per plan category. Requests run concurrently and are
    /// independent; a failed category does not affect the others.
    pub async fn plan(&self, params: &AdviceParams) -> Vec<PlanSection> {
        let requests = PlanCategory::ALL.into_iter().map(|category| async move {
            PlanSection {
                category,
                outcome: self.advise(params, Some(category.focus())).await,
            }
        });

        let sections = futures_util::future::join_all(requests).await;

        tracing::info!(
            categories = sections.len(),
            failed = sections.iter().filter(|s| !s.outcome.is_ok()).count(),
            "Generated plan"
        );

        sections
    }

    /// Continue a conversation. History is supplied by the client; nothing is kept here.
    pub async fn chat(
        &self,
        profile: &Profile,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> ChatOutcome {
        if !self.gemini.has_api_key() {
            return ChatOutcome::Failure(CHAT_UNAVAILABLE.to_string());
        }

        let mut turns = history;
        turns.push(ChatTurn::user(message));

        let request = GenerateRequest {
            system_instruction: Some(chat_instruction(profile)),
            turns,
            temperature: Some(CHAT_TEMPERATURE),
        };

        match self.gemini.generate(request).await {
            Ok(reply) => ChatOutcome::Reply(reply),
            Err(e) => {
                tracing::warn!(error = %e, "Chat generation failed");
                ChatOutcome::Failure(e.to_string())
            }
        }
    }
}
