use crate::core::money::Rate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Penalty applied once a metric rises above `above`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTier {
    pub above: Rate,
    pub penalty: i32,
}

/// Share of the 300-900 range each factor accounts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub payment_history: Rate,
    pub utilization: Rate,
    pub account_age: Rate,
    pub credit_mix: Rate,
    pub inquiries: Rate,
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights {
            payment_history: dec!(0.35),
            utilization: dec!(0.30),
            account_age: dec!(0.15),
            credit_mix: dec!(0.10),
            inquiries: dec!(0.10),
        }
    }
}

/// Where a penalised factor turns from Fair to Poor.
///
/// Good always means the factor lost no points; the penalty thresholds
/// decide that. Utilization is Poor once a second penalty tier is breached
/// and account age is Poor below `young_account_years`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusCutoffs {
    /// Most late payments still graded Fair
    pub late_payments_fair: u32,
    /// Most recent inquiries still graded Fair
    pub inquiries_fair: usize,
}

impl Default for StatusCutoffs {
    fn default() -> Self {
        StatusCutoffs {
            late_payments_fair: 2,
            inquiries_fair: 4,
        }
    }
}

/// Lending terms offered from `min_score` upwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTier {
    pub min_score: i32,
    /// Maximum loan as a multiple of monthly income
    pub income_multiple: u32,
    pub interest_rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub baseline: i32,
    pub min_score: i32,
    pub max_score: i32,
    pub weights: FactorWeights,
    pub late_payment_penalty: i32,
    /// Additive: every tier the utilization ratio exceeds applies
    pub utilization_penalties: Vec<PenaltyTier>,
    pub young_account_years: Decimal,
    pub young_account_penalty: i32,
    pub moderate_account_years: Decimal,
    pub moderate_account_penalty: i32,
    pub min_account_types: usize,
    pub limited_mix_penalty: i32,
    pub inquiry_window_days: i64,
    pub max_recent_inquiries: usize,
    pub inquiry_penalty: i32,
    pub status: StatusCutoffs,
    /// Scores below this also get secured-card credit building advice
    pub secured_card_below: i32,
    /// Highest `min_score` first
    pub loan_tiers: Vec<LoanTier>,
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            baseline: 750,
            min_score: 300,
            max_score: 900,
            weights: FactorWeights::default(),
            late_payment_penalty: 25,
            utilization_penalties: vec![
                PenaltyTier {
                    above: dec!(0.30),
                    penalty: 25,
                },
                PenaltyTier {
                    above: dec!(0.50),
                    penalty: 35,
                },
                PenaltyTier {
                    above: dec!(0.75),
                    penalty: 40,
                },
            ],
            young_account_years: dec!(2),
            young_account_penalty: 40,
            moderate_account_years: dec!(4),
            moderate_account_penalty: 20,
            min_account_types: 2,
            limited_mix_penalty: 25,
            inquiry_window_days: 365,
            max_recent_inquiries: 2,
            inquiry_penalty: 30,
            status: StatusCutoffs::default(),
            secured_card_below: 650,
            loan_tiers: vec![
                LoanTier {
                    min_score: 750,
                    income_multiple: 60,
                    interest_rate: dec!(0.085),
                },
                LoanTier {
                    min_score: 700,
                    income_multiple: 48,
                    interest_rate: dec!(0.095),
                },
                LoanTier {
                    min_score: 650,
                    income_multiple: 36,
                    interest_rate: dec!(0.11),
                },
                LoanTier {
                    min_score: 600,
                    income_multiple: 24,
                    interest_rate: dec!(0.13),
                },
            ],
        }
    }
}

impl ScoringRules {
    /// Points of the score range a factor with `weight` can account for
    pub fn factor_points(&self, weight: Rate) -> Decimal {
        Decimal::from(self.max_score - self.min_score) * weight
    }

    pub fn clamp(&self, score: i32) -> i32 {
        score.clamp(self.min_score, self.max_score)
    }
}
