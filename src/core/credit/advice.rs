use super::{
    CreditProfile, Factor, FactorStatus, Recommendation, ScoreBand, ScoreFactors,
    ScoringRules,
};
use crate::core::error::{ensure_non_negative, InputError};
use crate::core::money::{Money, Rate};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

struct Rule {
    factor: Factor,
    status: FactorStatus,
    title: &'static str,
    description: &'static str,
    gain: u32,
    timeframe_months: u32,
}

const RULES: &[Rule] = &[
    Rule {
        factor: Factor::PaymentHistory,
        status: FactorStatus::Fair,
        title: "Improve Payment History",
        description: "Set up automatic payments so no EMI or card bill is paid late",
        gain: 20,
        timeframe_months: 6,
    },
    Rule {
        factor: Factor::PaymentHistory,
        status: FactorStatus::Poor,
        title: "Improve Payment History",
        description: "Clear overdue amounts and automate payments; repeated late payments weigh heaviest on the score",
        gain: 20,
        timeframe_months: 6,
    },
    Rule {
        factor: Factor::Utilization,
        status: FactorStatus::Fair,
        title: "Reduce Credit Utilization",
        description: "Bring card balances below 30% of your total credit limit",
        gain: 10,
        timeframe_months: 2,
    },
    Rule {
        factor: Factor::Utilization,
        status: FactorStatus::Poor,
        title: "Reduce Credit Utilization",
        description: "Pay down card balances to below 30% of your total credit limit, or ask for a limit increase",
        gain: 25,
        timeframe_months: 2,
    },
    Rule {
        factor: Factor::AccountAge,
        status: FactorStatus::Fair,
        title: "Keep Old Accounts Open",
        description: "Don't close your oldest credit cards, even if unused",
        gain: 10,
        timeframe_months: 12,
    },
    Rule {
        factor: Factor::AccountAge,
        status: FactorStatus::Poor,
        title: "Keep Old Accounts Open",
        description: "Avoid opening new accounts and keep existing ones active so your average age grows",
        gain: 10,
        timeframe_months: 12,
    },
    Rule {
        factor: Factor::CreditMix,
        status: FactorStatus::Fair,
        title: "Diversify Credit Mix",
        description: "Consider having both installment loans and revolving credit",
        gain: 15,
        timeframe_months: 6,
    },
    Rule {
        factor: Factor::Inquiries,
        status: FactorStatus::Fair,
        title: "Limit New Credit Applications",
        description: "Avoid applying for new credit for the next 6 months",
        gain: 10,
        timeframe_months: 6,
    },
    Rule {
        factor: Factor::Inquiries,
        status: FactorStatus::Poor,
        title: "Limit New Credit Applications",
        description: "Stop applying for new credit for at least 12 months; each hard inquiry lowers the score",
        gain: 10,
        timeframe_months: 12,
    },
];

fn lookup(factor: Factor, status: FactorStatus) -> Option<&'static Rule> {
    RULES
        .iter()
        .find(|rule| rule.factor == factor && rule.status == status)
}

/// One recommendation per factor below Good, plus secured-card advice for
/// low scores, largest expected gain first.
/// With nothing to act on a single zero-gain "maintain" recommendation is returned.
pub fn recommendations(
    factors: &ScoreFactors,
    score: i32,
    rules: &ScoringRules,
) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = Factor::ALL
        .iter()
        .filter_map(|factor| {
            let status = factors.get(*factor).status;
            if status == FactorStatus::Good {
                return None;
            }
            lookup(*factor, status).map(|rule| Recommendation {
                factor: Some(rule.factor),
                title: rule.title.to_string(),
                description: rule.description.to_string(),
                expected_point_gain: rule.gain,
                timeframe_months: rule.timeframe_months,
            })
        })
        .collect();

    if score < rules.secured_card_below {
        recs.push(Recommendation {
            factor: None,
            title: "Consider a Secured Credit Card".to_string(),
            description: "Build credit history with a card backed by a fixed deposit".to_string(),
            expected_point_gain: 30,
            timeframe_months: 12,
        });
    }

    if recs.is_empty() {
        return vec![Recommendation {
            factor: None,
            title: "Maintain Healthy Credit Habits".to_string(),
            description: "Keep paying on time and utilization low; your profile has no weak factors"
                .to_string(),
            expected_point_gain: 0,
            timeframe_months: 0,
        }];
    }

    recs.sort_by(|a, b| b.expected_point_gain.cmp(&a.expected_point_gain));
    recs
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreChange {
    pub current_score: i32,
    pub projected_score: i32,
    pub improvement: i32,
}

/// What-if: score the current and a projected profile on the same day.
pub fn simulate_change(
    current: &CreditProfile,
    projected: &CreditProfile,
    as_of: NaiveDate,
    rules: &ScoringRules,
) -> Result<ScoreChange, InputError> {
    let current_score = current.score(as_of, rules)?.score;
    let projected_score = projected.score(as_of, rules)?.score;
    Ok(ScoreChange {
        current_score,
        projected_score,
        improvement: projected_score - current_score,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanEligibility {
    pub score: i32,
    pub band: ScoreBand,
    pub eligible: bool,
    pub income_multiple: u32,
    pub max_loan_amount: Money,
    pub estimated_interest_rate: Option<Rate>,
}

/// Indicative loan size and rate for a score and monthly income.
pub fn loan_eligibility(
    score: i32,
    monthly_income: Money,
    rules: &ScoringRules,
) -> Result<LoanEligibility, InputError> {
    ensure_non_negative("monthly_income", monthly_income)?;
    let tier = rules
        .loan_tiers
        .iter()
        .filter(|tier| score >= tier.min_score)
        .max_by_key(|tier| tier.min_score);

    Ok(match tier {
        Some(tier) => LoanEligibility {
            score,
            band: ScoreBand::from_score(score),
            eligible: true,
            income_multiple: tier.income_multiple,
            max_loan_amount: monthly_income * Decimal::from(tier.income_multiple),
            estimated_interest_rate: Some(tier.interest_rate),
        },
        None => LoanEligibility {
            score,
            band: ScoreBand::from_score(score),
            eligible: false,
            income_multiple: 0,
            max_loan_amount: Decimal::ZERO,
            estimated_interest_rate: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credit::{AccountType, CreditAccount, PaymentEvent};
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn card(limit: Money, balance: Money, late: usize) -> CreditAccount {
        CreditAccount {
            account_type: AccountType::CreditCard,
            opened_date: "2015-01-01".into(),
            credit_limit: limit,
            current_balance: balance,
            payment_events: (0..late)
                .map(|_| PaymentEvent {
                    date: "2024-05-01".into(),
                    on_time: false,
                })
                .collect(),
        }
    }

    fn loan() -> CreditAccount {
        CreditAccount {
            account_type: AccountType::HomeLoan,
            opened_date: "2016-01-01".into(),
            credit_limit: dec!(0),
            current_balance: dec!(1000000),
            payment_events: vec![],
        }
    }

    #[test]
    fn late_payments_and_high_utilization_both_recommended() {
        let profile = CreditProfile {
            accounts: vec![card(dec!(100000), dec!(60000), 3), loan()],
            inquiries: vec![],
        };
        let report = profile.score(as_of(), &ScoringRules::default()).unwrap();
        let titles: Vec<_> = report.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(report.score, 615);
        assert_eq!(
            titles,
            vec![
                "Consider a Secured Credit Card",
                "Reduce Credit Utilization",
                "Improve Payment History"
            ]
        );
        assert_eq!(report.recommendations[1].expected_point_gain, 25);
    }

    #[test]
    fn secured_card_only_below_cutoff() {
        let profile = CreditProfile {
            accounts: vec![card(dec!(100000), dec!(60000), 0), loan()],
            inquiries: vec![],
        };
        let report = profile.score(as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.score, 690);
        assert!(report
            .recommendations
            .iter()
            .all(|r| r.title != "Consider a Secured Credit Card"));

        let rules = ScoringRules {
            secured_card_below: 700,
            ..ScoringRules::default()
        };
        let report = profile.score(as_of(), &rules).unwrap();
        assert_eq!(report.recommendations[0].title, "Consider a Secured Credit Card");
        assert_eq!(report.recommendations[0].factor, None);
    }

    #[test]
    fn healthy_profile_gets_single_maintain_recommendation() {
        let profile = CreditProfile {
            accounts: vec![card(dec!(100000), dec!(5000), 0), loan()],
            inquiries: vec![],
        };
        let report = profile.score(as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].expected_point_gain, 0);
        assert_eq!(report.recommendations[0].factor, None);
    }

    #[test]
    fn every_weak_status_has_a_rule() {
        for factor in Factor::ALL {
            for status in [FactorStatus::Fair, FactorStatus::Poor] {
                if factor == Factor::CreditMix && status == FactorStatus::Poor {
                    continue;
                }
                assert!(lookup(factor, status).is_some(), "{:?} {:?}", factor, status);
            }
        }
    }

    #[test]
    fn paying_down_balance_improves_score() {
        let current = CreditProfile {
            accounts: vec![card(dec!(100000), dec!(80000), 0), loan()],
            inquiries: vec![],
        };
        let projected = CreditProfile {
            accounts: vec![card(dec!(100000), dec!(20000), 0), loan()],
            inquiries: vec![],
        };
        let change = simulate_change(&current, &projected, as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(change.current_score, 650);
        assert_eq!(change.projected_score, 750);
        assert_eq!(change.improvement, 100);
    }

    #[test]
    fn loan_tiers_by_score() {
        let rules = ScoringRules::default();
        let best = loan_eligibility(780, dec!(100000), &rules).unwrap();
        assert!(best.eligible);
        assert_eq!(best.max_loan_amount, dec!(6000000));
        assert_eq!(best.estimated_interest_rate, Some(dec!(0.085)));

        let fair = loan_eligibility(660, dec!(100000), &rules).unwrap();
        assert_eq!(fair.income_multiple, 36);

        let none = loan_eligibility(599, dec!(100000), &rules).unwrap();
        assert!(!none.eligible);
        assert_eq!(none.max_loan_amount, dec!(0));

        assert!(loan_eligibility(700, dec!(-1), &rules).is_err());
    }
}
