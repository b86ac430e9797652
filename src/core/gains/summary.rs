use super::{GainRecord, HoldingPeriods, InstrumentClass, Term};
use crate::core::money::{Money, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassTotals {
    pub short_term_gain: Money,
    pub long_term_gain: Money,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GainsSummary {
    pub total_gain: Money,
    pub short_term_gain: Money,
    pub long_term_gain: Money,
    pub count: usize,
    pub short_term_count: usize,
    pub long_term_count: usize,
    pub by_class: BTreeMap<InstrumentClass, ClassTotals>,
}

/// Sum gains by term and instrument class.
pub fn aggregate(records: &[GainRecord]) -> GainsSummary {
    let mut summary = GainsSummary::default();
    for record in records {
        let class = summary.by_class.entry(record.instrument_class).or_default();
        class.count += 1;
        match record.term {
            Term::Short => {
                summary.short_term_gain += record.gain_loss;
                summary.short_term_count += 1;
                class.short_term_gain += record.gain_loss;
            }
            Term::Long => {
                summary.long_term_gain += record.gain_loss;
                summary.long_term_count += 1;
                class.long_term_gain += record.gain_loss;
            }
        }
        summary.total_gain += record.gain_loss;
        summary.count += 1;
    }
    summary
}

/// Rates for one instrument class. `None` means taxed at the holder's slab rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTaxRates {
    pub short_term: Option<Rate>,
    pub long_term: Option<Rate>,
    /// Long-term gains share the annual exemption
    pub long_term_exempt: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalGainsRules {
    pub holding_periods: HoldingPeriods,
    pub equity: ClassTaxRates,
    pub mutual_fund: ClassTaxRates,
    pub debt: ClassTaxRates,
    pub crypto: ClassTaxRates,
    /// Annual long-term gain exempt from tax, shared by exempt classes
    pub long_term_exemption: Money,
}

impl Default for CapitalGainsRules {
    fn default() -> Self {
        let equity = ClassTaxRates {
            short_term: Some(dec!(0.15)),
            long_term: Some(dec!(0.10)),
            long_term_exempt: true,
        };
        CapitalGainsRules {
            holding_periods: HoldingPeriods::default(),
            mutual_fund: equity.clone(),
            equity,
            debt: ClassTaxRates {
                short_term: None,
                long_term: Some(dec!(0.20)),
                long_term_exempt: false,
            },
            crypto: ClassTaxRates {
                short_term: None,
                long_term: Some(dec!(0.30)),
                long_term_exempt: false,
            },
            long_term_exemption: dec!(100000),
        }
    }
}

impl CapitalGainsRules {
    pub fn rates(&self, class: InstrumentClass) -> &ClassTaxRates {
        match class {
            InstrumentClass::Equity => &self.equity,
            InstrumentClass::MutualFund => &self.mutual_fund,
            InstrumentClass::Debt => &self.debt,
            InstrumentClass::Crypto => &self.crypto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassTaxLine {
    pub class: InstrumentClass,
    pub short_term_gain: Money,
    /// `None` when short-term gains are added to slab income instead
    pub short_term_tax: Option<Money>,
    pub long_term_gain: Money,
    pub exemption_used: Money,
    pub long_term_tax: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GainsTaxEstimate {
    pub lines: Vec<ClassTaxLine>,
    /// Gains to be added to income and taxed at slab rates
    pub slab_taxable: Money,
    pub total_tax: Money,
}

/// Estimated tax on realised gains. Net losses in a class and term attract
/// no tax and are not set off against the other term.
pub fn estimate_tax(summary: &GainsSummary, rules: &CapitalGainsRules) -> GainsTaxEstimate {
    let mut exemption_left = rules.long_term_exemption;
    let mut slab_taxable = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut lines = Vec::new();

    for (class, totals) in &summary.by_class {
        let rates = rules.rates(*class);
        let short_term = totals.short_term_gain.max(Decimal::ZERO);
        let long_term = totals.long_term_gain.max(Decimal::ZERO);

        let short_term_tax = match rates.short_term {
            Some(rate) => Some((short_term * rate).round_dp(2)),
            None => {
                slab_taxable += short_term;
                None
            }
        };

        let exemption_used = if rates.long_term_exempt {
            let used = exemption_left.min(long_term);
            exemption_left -= used;
            used
        } else {
            Decimal::ZERO
        };
        let long_term_tax = match rates.long_term {
            Some(rate) => Some(((long_term - exemption_used) * rate).round_dp(2)),
            None => {
                slab_taxable += long_term - exemption_used;
                None
            }
        };

        total_tax += short_term_tax.unwrap_or(Decimal::ZERO) + long_term_tax.unwrap_or(Decimal::ZERO);
        lines.push(ClassTaxLine {
            class: *class,
            short_term_gain: totals.short_term_gain,
            short_term_tax,
            long_term_gain: totals.long_term_gain,
            exemption_used,
            long_term_tax,
        });
    }

    GainsTaxEstimate {
        lines,
        slab_taxable,
        total_tax,
    }
}
