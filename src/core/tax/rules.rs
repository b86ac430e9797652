//! Statutory tables for the income tax regimes, keyed by fiscal year.

use super::{DeductionCode, Regime};
use crate::core::fiscal::FiscalYear;
use crate::core::gains::CapitalGainsRules;
use crate::core::money::{Money, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Income bracket `[lower, upper)` taxed at `rate`. `upper = None` is open ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slab {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Rate,
}

impl Slab {
    fn new(lower: Money, upper: Option<Money>, rate: Rate) -> Self {
        Slab { lower, upper, rate }
    }

    /// Portion of `income` that falls inside this slab
    pub fn portion(&self, income: Money) -> Money {
        let top = match self.upper {
            Some(upper) => income.min(upper),
            None => income,
        };
        (top - self.lower).max(Decimal::ZERO)
    }
}

/// Section 87A rebate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebate {
    pub income_limit: Money,
    pub max_rebate: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRules {
    pub slabs: Vec<Slab>,
    /// Deduction codes the regime permits, with the statutory ceiling (`None` = uncapped)
    pub deductions: BTreeMap<DeductionCode, Option<Money>>,
    pub rebate: Option<Rebate>,
    /// Highest surcharge rate applicable under this regime
    pub surcharge_cap: Option<Rate>,
}

impl RegimeRules {
    pub fn permits(&self, code: DeductionCode) -> bool {
        self.deductions.contains_key(&code)
    }

    /// Ceiling for a permitted code. `None` if not permitted, `Some(None)` if uncapped.
    pub fn ceiling(&self, code: DeductionCode) -> Option<Option<Money>> {
        self.deductions.get(&code).copied()
    }

    /// Progressive slab tax before rebate, surcharge and cess
    pub fn slab_tax(&self, taxable_income: Money) -> Money {
        self.slabs
            .iter()
            .map(|slab| slab.portion(taxable_income) * slab.rate)
            .sum()
    }

    /// Rate applied to the next rupee above `taxable_income`
    pub fn marginal_rate(&self, taxable_income: Money) -> Rate {
        self.slabs
            .iter()
            .filter(|slab| taxable_income >= slab.lower)
            .last()
            .map(|slab| slab.rate)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn rebate_for(&self, taxable_income: Money, base_tax: Money) -> Money {
        match &self.rebate {
            Some(rebate) if taxable_income <= rebate.income_limit => {
                base_tax.min(rebate.max_rebate)
            }
            _ => Decimal::ZERO,
        }
    }
}

/// Surcharge applied on tax when taxable income exceeds `above`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTier {
    pub above: Money,
    pub rate: Rate,
}

/// Advance tax due date (within the fiscal year) and share of annual tax due by then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTaxStep {
    pub month: u32,
    pub day: u32,
    pub cumulative_percent: Rate,
}

/// Complete rule table for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRules {
    pub fiscal_year: FiscalYear,
    pub old_regime: RegimeRules,
    pub new_regime: RegimeRules,
    pub surcharge: Vec<SurchargeTier>,
    pub cess_rate: Rate,
    pub advance_tax: Vec<AdvanceTaxStep>,
    pub capital_gains: CapitalGainsRules,
}

impl TaxRules {
    /// Built-in table for a fiscal year. Years without a dedicated table
    /// use the nearest earlier one.
    pub fn for_year(fiscal_year: FiscalYear) -> TaxRules {
        let rules = match fiscal_year.0 {
            // FY 2025-26 onwards: revised new regime slabs, larger 87A rebate
            2026.. => fy_2025_26(),
            // FY 2024-25 and earlier
            _ => fy_2024_25(),
        };
        TaxRules {
            fiscal_year,
            ..rules
        }
    }

    pub fn regime(&self, regime: Regime) -> &RegimeRules {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }

    /// Surcharge rate for a taxable income, limited by the regime's cap
    pub fn surcharge_rate(&self, regime: Regime, taxable_income: Money) -> Rate {
        let rate = self
            .surcharge
            .iter()
            .filter(|tier| taxable_income > tier.above)
            .map(|tier| tier.rate)
            .max()
            .unwrap_or(Decimal::ZERO);
        match self.regime(regime).surcharge_cap {
            Some(cap) => rate.min(cap),
            None => rate,
        }
    }
}

fn old_regime_deductions() -> BTreeMap<DeductionCode, Option<Money>> {
    use DeductionCode::*;
    BTreeMap::from([
        (Section80C, Some(dec!(150000))),
        (Section80CCD1B, Some(dec!(50000))),
        (Section80D, Some(dec!(100000))),
        (Section80E, None),
        (Section80G, None),
        (Section80TTA, Some(dec!(10000))),
        (Section80TTB, Some(dec!(50000))),
        (Section24B, Some(dec!(200000))),
        (Hra, None),
        (Lta, None),
        (Standard, Some(dec!(50000))),
    ])
}

fn old_regime() -> RegimeRules {
    RegimeRules {
        slabs: vec![
            Slab::new(dec!(0), Some(dec!(250000)), dec!(0)),
            Slab::new(dec!(250000), Some(dec!(500000)), dec!(0.05)),
            Slab::new(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
            Slab::new(dec!(1000000), None, dec!(0.30)),
        ],
        deductions: old_regime_deductions(),
        rebate: Some(Rebate {
            income_limit: dec!(500000),
            max_rebate: dec!(12500),
        }),
        surcharge_cap: None,
    }
}

fn surcharge_tiers() -> Vec<SurchargeTier> {
    vec![
        SurchargeTier {
            above: dec!(5000000),
            rate: dec!(0.10),
        },
        SurchargeTier {
            above: dec!(10000000),
            rate: dec!(0.15),
        },
        SurchargeTier {
            above: dec!(20000000),
            rate: dec!(0.25),
        },
        SurchargeTier {
            above: dec!(50000000),
            rate: dec!(0.37),
        },
    ]
}

fn advance_tax_steps() -> Vec<AdvanceTaxStep> {
    [(6, dec!(0.15)), (9, dec!(0.45)), (12, dec!(0.75)), (3, dec!(1.00))]
        .into_iter()
        .map(|(month, cumulative_percent)| AdvanceTaxStep {
            month,
            day: 15,
            cumulative_percent,
        })
        .collect()
}

fn fy_2024_25() -> TaxRules {
    TaxRules {
        fiscal_year: FiscalYear(2025),
        old_regime: old_regime(),
        new_regime: RegimeRules {
            slabs: vec![
                Slab::new(dec!(0), Some(dec!(300000)), dec!(0)),
                Slab::new(dec!(300000), Some(dec!(600000)), dec!(0.05)),
                Slab::new(dec!(600000), Some(dec!(900000)), dec!(0.10)),
                Slab::new(dec!(900000), Some(dec!(1200000)), dec!(0.15)),
                Slab::new(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
                Slab::new(dec!(1500000), None, dec!(0.30)),
            ],
            deductions: BTreeMap::from([(DeductionCode::Standard, Some(dec!(50000)))]),
            rebate: Some(Rebate {
                income_limit: dec!(700000),
                max_rebate: dec!(25000),
            }),
            surcharge_cap: Some(dec!(0.25)),
        },
        surcharge: surcharge_tiers(),
        cess_rate: dec!(0.04),
        advance_tax: advance_tax_steps(),
        capital_gains: CapitalGainsRules::default(),
    }
}

fn fy_2025_26() -> TaxRules {
    TaxRules {
        fiscal_year: FiscalYear(2026),
        new_regime: RegimeRules {
            slabs: vec![
                Slab::new(dec!(0), Some(dec!(400000)), dec!(0)),
                Slab::new(dec!(400000), Some(dec!(800000)), dec!(0.05)),
                Slab::new(dec!(800000), Some(dec!(1200000)), dec!(0.10)),
                Slab::new(dec!(1200000), Some(dec!(1600000)), dec!(0.15)),
                Slab::new(dec!(1600000), Some(dec!(2000000)), dec!(0.20)),
                Slab::new(dec!(2000000), Some(dec!(2400000)), dec!(0.25)),
                Slab::new(dec!(2400000), None, dec!(0.30)),
            ],
            deductions: BTreeMap::from([(DeductionCode::Standard, Some(dec!(75000)))]),
            rebate: Some(Rebate {
                income_limit: dec!(1200000),
                max_rebate: dec!(60000),
            }),
            surcharge_cap: Some(dec!(0.25)),
        },
        ..fy_2024_25()
    }
}
