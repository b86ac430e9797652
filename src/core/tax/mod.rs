//! Old vs new income tax regime comparison.

mod regime;
pub mod rules;
mod tips;

pub use regime::compute_regime;
pub use rules::{AdvanceTaxStep, Rebate, RegimeRules, Slab, SurchargeTier, TaxRules};
pub use tips::{tax_saving_tips, Priority, TaxSavingTip};

use crate::core::error::{ensure_non_negative, InputError};
use crate::core::fiscal::FiscalYear;
use crate::core::money::{round_to_unit, Money, Rate};
use crate::core::warnings::Warning;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Income tax deduction sections.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum DeductionCode {
    #[serde(rename = "80C")]
    Section80C,
    #[serde(rename = "80CCD(1B)")]
    Section80CCD1B,
    #[serde(rename = "80D")]
    Section80D,
    #[serde(rename = "80E")]
    Section80E,
    #[serde(rename = "80G")]
    Section80G,
    #[serde(rename = "80TTA")]
    Section80TTA,
    #[serde(rename = "80TTB")]
    Section80TTB,
    #[serde(rename = "24B")]
    Section24B,
    #[serde(rename = "HRA")]
    Hra,
    #[serde(rename = "LTA")]
    Lta,
    #[serde(rename = "STANDARD")]
    Standard,
}

impl DeductionCode {
    pub fn code(&self) -> &'static str {
        match self {
            DeductionCode::Section80C => "80C",
            DeductionCode::Section80CCD1B => "80CCD(1B)",
            DeductionCode::Section80D => "80D",
            DeductionCode::Section80E => "80E",
            DeductionCode::Section80G => "80G",
            DeductionCode::Section80TTA => "80TTA",
            DeductionCode::Section80TTB => "80TTB",
            DeductionCode::Section24B => "24B",
            DeductionCode::Hra => "HRA",
            DeductionCode::Lta => "LTA",
            DeductionCode::Standard => "STANDARD",
        }
    }
}

impl std::fmt::Display for DeductionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Old,
    New,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Old => write!(f, "Old"),
            Regime::New => write!(f, "New"),
        }
    }
}

/// Income and deduction claims for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxProfile {
    #[schemars(with = "f64")]
    pub gross_income: Money,
    #[serde(default)]
    #[schemars(with = "BTreeMap<DeductionCode, f64>")]
    pub deduction_claims: BTreeMap<DeductionCode, Money>,
}

impl TaxProfile {
    pub fn new(gross_income: Money) -> Self {
        TaxProfile {
            gross_income,
            deduction_claims: BTreeMap::new(),
        }
    }

    pub fn with_claim(mut self, code: DeductionCode, amount: Money) -> Self {
        self.deduction_claims.insert(code, amount);
        self
    }

    pub fn claim(&self, code: DeductionCode) -> Money {
        self.deduction_claims
            .get(&code)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn validate(&self) -> Result<(), InputError> {
        ensure_non_negative("gross_income", self.gross_income)?;
        for (code, amount) in &self.deduction_claims {
            ensure_non_negative(format!("deduction_claims.{}", code.code()), *amount)?;
        }
        Ok(())
    }
}

/// A claimed deduction and the amount the regime allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionLine {
    pub code: DeductionCode,
    pub claimed: Money,
    pub allowed: Money,
}

impl DeductionLine {
    pub fn clamped(&self) -> bool {
        self.allowed < self.claimed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegimeResult {
    pub regime: Regime,
    pub taxable_income: Money,
    /// Whole rupees
    pub tax_payable: Money,
    /// Sum of allowed deductions
    pub deductions_claimed: Money,
    pub base_tax: Money,
    pub rebate: Money,
    pub surcharge: Money,
    pub cess: Money,
    pub deductions: Vec<DeductionLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvanceTaxInstallment {
    pub due_date: NaiveDate,
    pub cumulative_percent: Rate,
    /// Amount due at this installment (not cumulative)
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxComparison {
    pub fiscal_year: FiscalYear,
    pub old_regime: RegimeResult,
    pub new_regime: RegimeResult,
    pub recommended_regime: Regime,
    pub savings: Money,
    pub advance_tax_schedule: Vec<AdvanceTaxInstallment>,
    pub warnings: Vec<Warning>,
}

impl TaxComparison {
    pub fn recommended(&self) -> &RegimeResult {
        match self.recommended_regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }
}

/// Compute tax under both regimes and recommend the cheaper one (ties go to the new regime).
pub fn compare(profile: &TaxProfile, rules: &TaxRules) -> Result<TaxComparison, InputError> {
    profile.validate()?;

    let old_regime = compute_regime(profile, Regime::Old, rules);
    let new_regime = compute_regime(profile, Regime::New, rules);

    let recommended_regime = if old_regime.tax_payable < new_regime.tax_payable {
        Regime::Old
    } else {
        Regime::New
    };
    let savings = (old_regime.tax_payable - new_regime.tax_payable).abs();

    let mut warnings: Vec<Warning> = Vec::new();
    for line in old_regime
        .deductions
        .iter()
        .chain(new_regime.deductions.iter())
        .filter(|line| line.clamped() && !line.allowed.is_zero())
    {
        let warning = Warning::DeductionClamped {
            code: line.code,
            claimed: line.claimed,
            allowed: line.allowed,
        };
        if !warnings.contains(&warning) {
            log::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    let tax_payable = match recommended_regime {
        Regime::Old => old_regime.tax_payable,
        Regime::New => new_regime.tax_payable,
    };
    let advance_tax_schedule = advance_tax_schedule(tax_payable, rules);

    log::info!(
        "{}: old regime tax {}, new regime tax {}, recommending {}",
        rules.fiscal_year,
        old_regime.tax_payable,
        new_regime.tax_payable,
        recommended_regime
    );

    Ok(TaxComparison {
        fiscal_year: rules.fiscal_year,
        old_regime,
        new_regime,
        recommended_regime,
        savings,
        advance_tax_schedule,
        warnings,
    })
}

/// Split annual tax into installments. Each cumulative figure is rounded to
/// whole rupees and the final installment settles the remainder, so the
/// amounts always sum to `tax_payable`.
pub fn advance_tax_schedule(tax_payable: Money, rules: &TaxRules) -> Vec<AdvanceTaxInstallment> {
    let mut paid = Decimal::ZERO;
    let last = rules.advance_tax.len().saturating_sub(1);
    rules
        .advance_tax
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let cumulative = if idx == last {
                tax_payable
            } else {
                round_to_unit(tax_payable * step.cumulative_percent)
            };
            let amount = cumulative - paid;
            paid = cumulative;
            AdvanceTaxInstallment {
                due_date: rules.fiscal_year.date(step.month, step.day),
                cumulative_percent: step.cumulative_percent,
                amount,
            }
        })
        .collect()
}
