use super::{compute_regime, DeductionCode, Regime, TaxProfile, TaxRules};
use crate::core::money::{Money, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Basic health cover premium below which a policy is suggested
const BASIC_HEALTH_COVER: Money = dec!(25000);
/// Income above which an HRA claim is worth checking
const HRA_INCOME_THRESHOLD: Money = dec!(500000);
/// Typical annual HRA exemption used for the estimate
const TYPICAL_HRA_EXEMPTION: Money = dec!(100000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSavingTip {
    pub code: DeductionCode,
    pub title: String,
    pub description: String,
    pub action: String,
    pub potential_saving: Money,
    pub priority: Priority,
}

/// Suggestions for unused old-regime deductions, largest saving first.
///
/// Savings are estimated at the old regime's marginal slab rate for the
/// profile's current taxable income.
pub fn tax_saving_tips(profile: &TaxProfile, rules: &TaxRules) -> Vec<TaxSavingTip> {
    let old = rules.regime(Regime::Old);
    let current = compute_regime(profile, Regime::Old, rules);
    let rate = old.marginal_rate(current.taxable_income);
    let ceiling = |code: DeductionCode| old.ceiling(code).flatten().unwrap_or(Decimal::ZERO);

    let mut tips = Vec::new();

    let headroom_80c = (ceiling(DeductionCode::Section80C) - profile.claim(DeductionCode::Section80C))
        .max(Decimal::ZERO);
    if headroom_80c > Decimal::ZERO {
        tips.push(tip(
            DeductionCode::Section80C,
            "Maximize 80C Deductions",
            format!("You can claim up to ₹{} more under Section 80C", headroom_80c.round_dp(0)),
            "Invest in PPF, ELSS, or pay life insurance premiums",
            headroom_80c,
            rate,
            Priority::High,
        ));
    }

    let health = profile.claim(DeductionCode::Section80D);
    if health < BASIC_HEALTH_COVER {
        tips.push(tip(
            DeductionCode::Section80D,
            "Health Insurance Premium",
            "Health insurance premiums reduce taxable income and cover medical costs".to_string(),
            "Purchase health insurance for self and family",
            BASIC_HEALTH_COVER - health,
            rate,
            Priority::High,
        ));
    }

    if profile.claim(DeductionCode::Section24B).is_zero() {
        let limit = ceiling(DeductionCode::Section24B);
        tips.push(tip(
            DeductionCode::Section24B,
            "Home Loan Interest Deduction",
            format!("Home loan interest up to ₹{} can be claimed", limit.round_dp(0)),
            "Consider a home loan for tax benefits if planning to buy property",
            limit,
            rate,
            Priority::Medium,
        ));
    }

    let headroom_nps = (ceiling(DeductionCode::Section80CCD1B)
        - profile.claim(DeductionCode::Section80CCD1B))
    .max(Decimal::ZERO);
    if headroom_nps > Decimal::ZERO {
        tips.push(tip(
            DeductionCode::Section80CCD1B,
            "Additional NPS Deduction",
            format!("NPS contributions allow a further ₹{} deduction", headroom_nps.round_dp(0)),
            "Open an NPS account and contribute",
            headroom_nps,
            rate,
            Priority::Medium,
        ));
    }

    if profile.claim(DeductionCode::Hra).is_zero() && profile.gross_income > HRA_INCOME_THRESHOLD {
        tips.push(tip(
            DeductionCode::Hra,
            "House Rent Allowance",
            "Claim HRA exemption if paying rent".to_string(),
            "Submit rent receipts, and the landlord's PAN if rent exceeds ₹1L a year",
            TYPICAL_HRA_EXEMPTION,
            rate,
            Priority::High,
        ));
    }

    // Stable: equal savings keep the order above
    tips.sort_by(|a, b| b.potential_saving.cmp(&a.potential_saving));
    tips
}

fn tip(
    code: DeductionCode,
    title: &str,
    description: String,
    action: &str,
    amount: Money,
    rate: Rate,
    priority: Priority,
) -> TaxSavingTip {
    TaxSavingTip {
        code,
        title: title.to_string(),
        description,
        action: action.to_string(),
        potential_saving: (amount * rate).round_dp(0),
        priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fiscal::FiscalYear;

    #[test]
    fn suggests_unused_deductions_at_marginal_rate() {
        let rules = TaxRules::for_year(FiscalYear(2025));
        let profile = TaxProfile::new(dec!(800000)).with_claim(DeductionCode::Section80C, dec!(100000));
        let tips = tax_saving_tips(&profile, &rules);

        // Taxable 700000 sits in the 20% slab
        let codes: Vec<_> = tips.iter().map(|t| t.code).collect();
        assert_eq!(
            codes,
            vec![
                DeductionCode::Section24B,
                DeductionCode::Hra,
                DeductionCode::Section80C,
                DeductionCode::Section80CCD1B,
                DeductionCode::Section80D,
            ]
        );
        assert_eq!(tips[0].potential_saving, dec!(40000));
        assert_eq!(tips[2].potential_saving, dec!(10000));
        assert_eq!(tips[4].potential_saving, dec!(5000));
    }

    #[test]
    fn fully_used_deductions_produce_no_tips() {
        let rules = TaxRules::for_year(FiscalYear(2025));
        let profile = TaxProfile::new(dec!(2000000))
            .with_claim(DeductionCode::Section80C, dec!(150000))
            .with_claim(DeductionCode::Section80CCD1B, dec!(50000))
            .with_claim(DeductionCode::Section80D, dec!(25000))
            .with_claim(DeductionCode::Section24B, dec!(200000))
            .with_claim(DeductionCode::Hra, dec!(120000));
        assert!(tax_saving_tips(&profile, &rules).is_empty());
    }

    #[test]
    fn low_income_tips_have_no_saving() {
        let rules = TaxRules::for_year(FiscalYear(2025));
        let tips = tax_saving_tips(&TaxProfile::new(dec!(200000)), &rules);
        assert!(tips.iter().all(|t| t.potential_saving.is_zero()));
        assert!(tips.iter().all(|t| t.code != DeductionCode::Hra));
    }
}
