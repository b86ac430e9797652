use super::advice::recommendations;
use super::{
    validate_accounts, CreditAccount, CreditInquiry, Factor, FactorScore, FactorStatus, ScoreBand,
    ScoreFactors, ScoreReport, ScoringRules,
};
use crate::core::dates::{years_between, LenientDate};
use crate::core::error::InputError;
use crate::core::money::Rate;
use crate::core::warnings::Warning;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Score a set of accounts and inquiries as of a given day.
///
/// Dates that fail to parse are left out of the age and inquiry-recency
/// figures and reported as warnings.
pub fn score(
    accounts: &[CreditAccount],
    inquiries: &[CreditInquiry],
    as_of: NaiveDate,
    rules: &ScoringRules,
) -> Result<ScoreReport, InputError> {
    validate_accounts(accounts)?;

    let mut warnings = Vec::new();

    let late_payments = accounts
        .iter()
        .flat_map(|a| a.payment_events.iter())
        .filter(|e| !e.on_time)
        .count() as u32;
    let payment_lost = late_payments as i32 * rules.late_payment_penalty;
    let payment_status = if late_payments == 0 {
        FactorStatus::Good
    } else if late_payments <= rules.status.late_payments_fair {
        FactorStatus::Fair
    } else {
        FactorStatus::Poor
    };

    let utilization_ratio = utilization(accounts);
    let breached: Vec<i32> = utilization_ratio
        .map(|ratio| {
            rules
                .utilization_penalties
                .iter()
                .filter(|tier| ratio > tier.above)
                .map(|tier| tier.penalty)
                .collect()
        })
        .unwrap_or_default();
    let utilization_lost = breached.iter().sum::<i32>();
    let utilization_status = match breached.len() {
        0 => FactorStatus::Good,
        1 => FactorStatus::Fair,
        _ => FactorStatus::Poor,
    };

    let opened: Vec<NaiveDate> = accounts
        .iter()
        .enumerate()
        .filter_map(|(idx, a)| {
            known_date(
                &a.opened_date,
                format!("accounts[{idx}].opened_date"),
                &mut warnings,
            )
        })
        .collect();
    let average_age_years = average_age(&opened, as_of);
    let (age_lost, age_status) = match average_age_years {
        Some(age) if age < rules.young_account_years => {
            (rules.young_account_penalty, FactorStatus::Poor)
        }
        Some(age) if age < rules.moderate_account_years => {
            (rules.moderate_account_penalty, FactorStatus::Fair)
        }
        _ => (0, FactorStatus::Good),
    };

    let distinct_account_types = accounts
        .iter()
        .map(|a| a.account_type)
        .collect::<BTreeSet<_>>()
        .len();
    let thin_mix = !accounts.is_empty() && distinct_account_types < rules.min_account_types;
    let mix_lost = if thin_mix { rules.limited_mix_penalty } else { 0 };
    let mix_status = if thin_mix {
        FactorStatus::Fair
    } else {
        FactorStatus::Good
    };

    let recent_inquiries = inquiries
        .iter()
        .enumerate()
        .filter_map(|(idx, q)| {
            known_date(&q.date, format!("inquiries[{idx}].date"), &mut warnings)
        })
        .filter(|date| {
            let days = (as_of - *date).num_days();
            (0..rules.inquiry_window_days).contains(&days)
        })
        .count();
    let (inquiry_lost, inquiry_status) = if recent_inquiries <= rules.max_recent_inquiries {
        (0, FactorStatus::Good)
    } else if recent_inquiries <= rules.status.inquiries_fair {
        (rules.inquiry_penalty, FactorStatus::Fair)
    } else {
        (rules.inquiry_penalty, FactorStatus::Poor)
    };

    let weights = &rules.weights;
    let factors = ScoreFactors {
        payment_history: factor_score(
            Factor::PaymentHistory,
            weights.payment_history,
            payment_lost,
            payment_status,
            rules,
        ),
        utilization: factor_score(
            Factor::Utilization,
            weights.utilization,
            utilization_lost,
            utilization_status,
            rules,
        ),
        account_age: factor_score(
            Factor::AccountAge,
            weights.account_age,
            age_lost,
            age_status,
            rules,
        ),
        credit_mix: factor_score(
            Factor::CreditMix,
            weights.credit_mix,
            mix_lost,
            mix_status,
            rules,
        ),
        inquiries: factor_score(
            Factor::Inquiries,
            weights.inquiries,
            inquiry_lost,
            inquiry_status,
            rules,
        ),
        late_payments,
        utilization_ratio,
        average_age_years,
        distinct_account_types,
        recent_inquiries,
    };

    for factor in factors.iter().filter(|f| f.points_lost > 0) {
        log::debug!("{}: -{} points", factor.factor.name(), factor.points_lost);
    }

    let score = rules.clamp(rules.baseline - factors.total_points_lost());
    let band = ScoreBand::from_score(score);
    let recommendations = recommendations(&factors, score, rules);

    log::info!(
        "Credit score {} ({}) from {} accounts, {} inquiries",
        score,
        band,
        accounts.len(),
        inquiries.len()
    );

    Ok(ScoreReport {
        score,
        band,
        factors,
        recommendations,
        warnings,
    })
}

/// Aggregate balance over limit, ignoring accounts without a limit
fn utilization(accounts: &[CreditAccount]) -> Option<Rate> {
    let (balance, limit) = accounts
        .iter()
        .filter(|a| a.credit_limit > Decimal::ZERO)
        .fold((Decimal::ZERO, Decimal::ZERO), |(b, l), a| {
            (b + a.current_balance, l + a.credit_limit)
        });
    if limit.is_zero() {
        None
    } else {
        Some(balance / limit)
    }
}

/// Mean age in years. Accounts opened after `as_of` count as brand new.
fn average_age(opened: &[NaiveDate], as_of: NaiveDate) -> Option<Decimal> {
    if opened.is_empty() {
        return None;
    }
    let total: Decimal = opened
        .iter()
        .map(|date| years_between(*date, as_of).max(Decimal::ZERO))
        .sum();
    Some(total / Decimal::from(opened.len()))
}

fn known_date(date: &LenientDate, field: String, warnings: &mut Vec<Warning>) -> Option<NaiveDate> {
    match date {
        LenientDate::Parsed(date) => Some(*date),
        LenientDate::Unparsed(raw) => {
            log::warn!("Ignoring unparseable date '{}' in {}", raw, field);
            warnings.push(Warning::UnparseableDate {
                field,
                value: raw.clone(),
            });
            None
        }
    }
}

fn factor_score(
    factor: Factor,
    weight: Rate,
    points_lost: i32,
    status: FactorStatus,
    rules: &ScoringRules,
) -> FactorScore {
    let points = rules.factor_points(weight);
    let sub_score = if points.is_zero() {
        100
    } else {
        let held = Decimal::ONE_HUNDRED - Decimal::from(points_lost) * Decimal::ONE_HUNDRED / points;
        held.max(Decimal::ZERO).round().to_u32().unwrap_or(0)
    };
    FactorScore {
        factor,
        weight,
        points_lost,
        sub_score,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credit::{AccountType, PaymentEvent};
    use crate::core::money::Money;
    use rust_decimal_macros::dec;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn as_of() -> NaiveDate {
        ymd(2025, 1, 1)
    }

    fn account(kind: AccountType, opened: &str, limit: Money, balance: Money) -> CreditAccount {
        CreditAccount {
            account_type: kind,
            opened_date: opened.into(),
            credit_limit: limit,
            current_balance: balance,
            payment_events: vec![],
        }
    }

    fn inquiry(date: &str) -> CreditInquiry {
        CreditInquiry {
            date: date.into(),
            kind: AccountType::PersonalLoan,
        }
    }

    #[test]
    fn empty_history_scores_baseline() {
        let report = score(&[], &[], as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.score, 750);
        assert_eq!(report.band, ScoreBand::Excellent);
        assert_eq!(report.factors.utilization_ratio, None);
        assert_eq!(report.factors.average_age_years, None);
        assert!(report.factors.iter().all(|f| f.status == FactorStatus::Good));
    }

    #[test]
    fn healthy_profile_keeps_baseline() {
        let accounts = vec![
            account(AccountType::CreditCard, "2015-01-01", dec!(100000), dec!(10000)),
            account(AccountType::HomeLoan, "2016-06-01", dec!(0), dec!(2500000)),
        ];
        let report = score(&accounts, &[], as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.score, 750);
        assert_eq!(report.factors.utilization_ratio, Some(dec!(0.1)));
        assert_eq!(report.factors.distinct_account_types, 2);
    }

    #[test]
    fn utilization_penalties_are_additive() {
        let accounts = vec![
            account(AccountType::CreditCard, "2015-01-01", dec!(100000), dec!(60000)),
            account(AccountType::PersonalLoan, "2015-01-01", dec!(0), dec!(0)),
        ];
        let report = score(&accounts, &[], as_of(), &ScoringRules::default()).unwrap();
        // Above 30% and 50%
        assert_eq!(report.factors.utilization.points_lost, 60);
        assert_eq!(report.factors.utilization.status, FactorStatus::Poor);
        assert_eq!(report.score, 690);
    }

    #[test]
    fn late_payments_cost_points_each() {
        let mut card = account(AccountType::CreditCard, "2015-01-01", dec!(100000), dec!(0));
        card.payment_events = (1..=4)
            .map(|m| PaymentEvent {
                date: LenientDate::from(ymd(2024, m, 5)),
                on_time: m % 2 == 0,
            })
            .collect();
        let loan = account(AccountType::AutoLoan, "2018-01-01", dec!(0), dec!(0));
        let report = score(&[card, loan], &[], as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.factors.late_payments, 2);
        assert_eq!(report.factors.payment_history.points_lost, 50);
        assert_eq!(report.factors.payment_history.status, FactorStatus::Fair);
        assert_eq!(report.score, 700);
    }

    #[test]
    fn young_accounts_and_thin_mix() {
        let accounts = vec![account(AccountType::CreditCard, "2024-01-01", dec!(50000), dec!(0))];
        let report = score(&accounts, &[], as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.factors.account_age.points_lost, 40);
        assert_eq!(report.factors.account_age.status, FactorStatus::Poor);
        assert_eq!(report.factors.credit_mix.points_lost, 25);
        assert_eq!(report.score, 685);
    }

    #[test]
    fn moderate_age_costs_less() {
        let accounts = vec![
            account(AccountType::CreditCard, "2022-01-01", dec!(50000), dec!(0)),
            account(AccountType::PersonalLoan, "2022-01-01", dec!(0), dec!(0)),
        ];
        let report = score(&accounts, &[], as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.factors.account_age.points_lost, 20);
        assert_eq!(report.factors.account_age.status, FactorStatus::Fair);
    }

    #[test]
    fn only_inquiries_in_trailing_year_count() {
        let inquiries = vec![
            inquiry("2024-12-01"),
            inquiry("2024-06-01"),
            inquiry("2024-02-01"),
            inquiry("2023-06-01"),
            inquiry("2025-06-01"),
        ];
        let report = score(&[], &inquiries, as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.factors.recent_inquiries, 3);
        assert_eq!(report.factors.inquiries.points_lost, 30);
        assert_eq!(report.score, 720);
    }

    #[test]
    fn bad_dates_are_skipped_with_warning() {
        let accounts = vec![
            account(AccountType::CreditCard, "sometime", dec!(50000), dec!(0)),
            account(AccountType::HomeLoan, "2010-01-01", dec!(0), dec!(0)),
        ];
        let inquiries = vec![inquiry("??"), inquiry("2024-12-01")];
        let report = score(&accounts, &inquiries, as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.factors.recent_inquiries, 1);
        // Only the parseable account contributes to age
        assert!(report.factors.average_age_years.unwrap() > dec!(14));
        assert_eq!(report.score, 750);
    }

    #[test]
    fn score_never_leaves_range() {
        let mut card = account(AccountType::CreditCard, "2024-12-01", dec!(1000), dec!(5000));
        card.payment_events = (0..40)
            .map(|_| PaymentEvent {
                date: "2024-06-01".into(),
                on_time: false,
            })
            .collect();
        let inquiries: Vec<_> = (0..10).map(|_| inquiry("2024-11-01")).collect();
        let report = score(&[card], &inquiries, as_of(), &ScoringRules::default()).unwrap();
        assert_eq!(report.score, 300);
        assert_eq!(report.factors.payment_history.sub_score, 0);
    }

    #[test]
    fn lowered_thresholds_move_status_with_penalty() {
        let rules: ScoringRules = serde_json::from_str(
            r#"{
                "max_recent_inquiries": 1,
                "moderate_account_years": 12,
                "utilization_penalties": [{"above": "0.05", "penalty": 15}]
            }"#,
        )
        .unwrap();
        let accounts = vec![
            account(AccountType::CreditCard, "2015-01-01", dec!(100000), dec!(10000)),
            account(AccountType::HomeLoan, "2016-06-01", dec!(0), dec!(0)),
        ];
        let inquiries = vec![inquiry("2024-12-01"), inquiry("2024-10-01")];
        let report = score(&accounts, &inquiries, as_of(), &rules).unwrap();

        assert_eq!(report.score, 750 - 30 - 20 - 15);
        for factor in report.factors.iter() {
            assert_eq!(
                factor.points_lost > 0,
                factor.status != FactorStatus::Good,
                "{:?}",
                factor.factor
            );
        }
        assert_eq!(report.factors.inquiries.status, FactorStatus::Fair);
        assert_eq!(report.factors.account_age.status, FactorStatus::Fair);
        assert_eq!(report.factors.utilization.status, FactorStatus::Fair);
        let titles: Vec<_> = report.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert!(titles.contains(&"Limit New Credit Applications"), "{titles:?}");
        assert!(!titles.contains(&"Maintain Healthy Credit Habits"), "{titles:?}");
    }
}
