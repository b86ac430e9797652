//! CIBIL-style credit score model.
//!
//! The score starts from a baseline and loses points for late payments,
//! high utilization, young accounts, a thin account mix and recent
//! inquiries. Each factor's qualitative status then drives a fixed
//! recommendation table.

mod advice;
pub mod rules;
mod score;

pub use advice::{loan_eligibility, recommendations, simulate_change, LoanEligibility, ScoreChange};
pub use rules::{FactorWeights, LoanTier, PenaltyTier, ScoringRules, StatusCutoffs};
pub use score::score;

use crate::core::dates::LenientDate;
use crate::core::error::{ensure_non_negative, InputError};
use crate::core::money::{Money, Rate};
use crate::core::warnings::Warning;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    CreditCard,
    PersonalLoan,
    HomeLoan,
    AutoLoan,
    EducationLoan,
    GoldLoan,
    BusinessLoan,
    ConsumerLoan,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PaymentEvent {
    #[schemars(with = "String")]
    pub date: LenientDate,
    pub on_time: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreditAccount {
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[schemars(with = "String")]
    pub opened_date: LenientDate,
    #[schemars(with = "f64")]
    pub credit_limit: Money,
    #[schemars(with = "f64")]
    pub current_balance: Money,
    #[serde(default)]
    pub payment_events: Vec<PaymentEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreditInquiry {
    #[schemars(with = "String")]
    pub date: LenientDate,
    #[serde(rename = "type", default)]
    pub kind: AccountType,
}

/// Accounts and inquiries for one scoring run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CreditProfile {
    #[serde(default)]
    pub accounts: Vec<CreditAccount>,
    #[serde(default)]
    pub inquiries: Vec<CreditInquiry>,
}

impl CreditProfile {
    pub fn validate(&self) -> Result<(), InputError> {
        validate_accounts(&self.accounts)
    }

    pub fn score(&self, as_of: NaiveDate, rules: &ScoringRules) -> Result<ScoreReport, InputError> {
        score(&self.accounts, &self.inquiries, as_of, rules)
    }
}

pub(crate) fn validate_accounts(accounts: &[CreditAccount]) -> Result<(), InputError> {
    for (idx, account) in accounts.iter().enumerate() {
        ensure_non_negative(format!("accounts[{idx}].credit_limit"), account.credit_limit)?;
        ensure_non_negative(
            format!("accounts[{idx}].current_balance"),
            account.current_balance,
        )?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    PaymentHistory,
    Utilization,
    AccountAge,
    CreditMix,
    Inquiries,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::PaymentHistory,
        Factor::Utilization,
        Factor::AccountAge,
        Factor::CreditMix,
        Factor::Inquiries,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Factor::PaymentHistory => "Payment history",
            Factor::Utilization => "Credit utilization",
            Factor::AccountAge => "Account age",
            Factor::CreditMix => "Credit mix",
            Factor::Inquiries => "Recent inquiries",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for FactorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactorStatus::Good => write!(f, "Good"),
            FactorStatus::Fair => write!(f, "Fair"),
            FactorStatus::Poor => write!(f, "Poor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactorScore {
    pub factor: Factor,
    pub weight: Rate,
    pub points_lost: i32,
    /// 0-100, share of the factor's weighted points still held
    pub sub_score: u32,
    pub status: FactorStatus,
}

/// Per-factor breakdown and the metrics behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreFactors {
    pub payment_history: FactorScore,
    pub utilization: FactorScore,
    pub account_age: FactorScore,
    pub credit_mix: FactorScore,
    pub inquiries: FactorScore,
    pub late_payments: u32,
    /// `None` when no account has a credit limit
    pub utilization_ratio: Option<Rate>,
    /// `None` when no account has a usable opened date
    pub average_age_years: Option<Decimal>,
    pub distinct_account_types: usize,
    pub recent_inquiries: usize,
}

impl ScoreFactors {
    pub fn iter(&self) -> impl Iterator<Item = &FactorScore> {
        [
            &self.payment_history,
            &self.utilization,
            &self.account_age,
            &self.credit_mix,
            &self.inquiries,
        ]
        .into_iter()
    }

    pub fn get(&self, factor: Factor) -> &FactorScore {
        match factor {
            Factor::PaymentHistory => &self.payment_history,
            Factor::Utilization => &self.utilization,
            Factor::AccountAge => &self.account_age,
            Factor::CreditMix => &self.credit_mix,
            Factor::Inquiries => &self.inquiries,
        }
    }

    pub fn total_points_lost(&self) -> i32 {
        self.iter().map(|f| f.points_lost).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// `None` for the general "maintain habits" advice
    pub factor: Option<Factor>,
    pub title: String,
    pub description: String,
    pub expected_point_gain: u32,
    pub timeframe_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
    Bad,
}

impl ScoreBand {
    pub fn from_score(score: i32) -> ScoreBand {
        match score {
            750.. => ScoreBand::Excellent,
            700..=749 => ScoreBand::Good,
            650..=699 => ScoreBand::Fair,
            550..=649 => ScoreBand::Poor,
            _ => ScoreBand::Bad,
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
            ScoreBand::Bad => "Bad",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub score: i32,
    pub band: ScoreBand,
    pub factors: ScoreFactors,
    pub recommendations: Vec<Recommendation>,
    pub warnings: Vec<Warning>,
}
