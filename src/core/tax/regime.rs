use super::{DeductionLine, Regime, RegimeResult, TaxProfile, TaxRules};
use crate::core::money::round_to_unit;
use rust_decimal::Decimal;

/// Tax under a single regime. Claims the regime does not permit are listed
/// with nothing allowed; permitted claims are capped at their ceiling.
///
/// Only `tax_payable` is rounded; the components are carried at full precision.
pub fn compute_regime(profile: &TaxProfile, regime: Regime, rules: &TaxRules) -> RegimeResult {
    let regime_rules = rules.regime(regime);

    let deductions: Vec<DeductionLine> = profile
        .deduction_claims
        .iter()
        .map(|(code, claimed)| {
            let allowed = match regime_rules.ceiling(*code) {
                None => Decimal::ZERO,
                Some(None) => *claimed,
                Some(Some(ceiling)) => (*claimed).min(ceiling),
            };
            DeductionLine {
                code: *code,
                claimed: *claimed,
                allowed,
            }
        })
        .collect();

    let deductions_claimed: Decimal = deductions.iter().map(|line| line.allowed).sum();
    let taxable_income = (profile.gross_income - deductions_claimed).max(Decimal::ZERO);

    let base_tax = regime_rules.slab_tax(taxable_income);
    let rebate = regime_rules.rebate_for(taxable_income, base_tax);
    let after_rebate = base_tax - rebate;
    let surcharge = after_rebate * rules.surcharge_rate(regime, taxable_income);
    let cess = (after_rebate + surcharge) * rules.cess_rate;
    let tax_payable = round_to_unit(after_rebate + surcharge + cess);

    log::debug!(
        "{} regime: taxable={} base={} rebate={} surcharge={} cess={} payable={}",
        regime,
        taxable_income,
        base_tax,
        rebate,
        surcharge,
        cess,
        tax_payable
    );

    RegimeResult {
        regime,
        taxable_income,
        tax_payable,
        deductions_claimed,
        base_tax,
        rebate,
        surcharge,
        cess,
        deductions,
    }
}
