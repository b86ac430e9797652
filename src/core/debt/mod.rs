//! Month-by-month debt payoff under snowball or avalanche ordering.

mod import;

pub use import::read_debts_csv;

use crate::core::error::{ensure_non_negative, InputError};
use crate::core::money::{Money, Rate};
use crate::core::warnings::Warning;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DebtKind {
    #[default]
    Loan,
    CreditCard,
    HomeLoan,
    PersonalLoan,
    AutoLoan,
    EducationLoan,
    Other,
}

impl DebtKind {
    pub fn parse(raw: &str) -> DebtKind {
        match raw.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "" | "loan" => DebtKind::Loan,
            "credit_card" | "card" => DebtKind::CreditCard,
            "home_loan" | "mortgage" => DebtKind::HomeLoan,
            "personal_loan" => DebtKind::PersonalLoan,
            "auto_loan" | "car_loan" | "vehicle_loan" => DebtKind::AutoLoan,
            "education_loan" | "student_loan" => DebtKind::EducationLoan,
            _ => DebtKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Debt {
    pub lender: String,
    #[schemars(with = "f64")]
    pub principal: Money,
    /// Annual rate as a fraction (0.12 = 12%)
    #[schemars(with = "f64")]
    pub annual_rate: Rate,
    #[schemars(with = "f64")]
    pub minimum_payment: Money,
    #[serde(rename = "type", default)]
    pub kind: DebtKind,
}

impl Debt {
    pub fn new(lender: &str, principal: Money, annual_rate: Rate, minimum_payment: Money) -> Self {
        Debt {
            lender: lender.to_string(),
            principal,
            annual_rate,
            minimum_payment,
            kind: DebtKind::default(),
        }
    }

    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate / Decimal::from(12)
    }

    /// Minimum payment does not cover the first month's interest
    pub fn negatively_amortizes(&self) -> bool {
        self.minimum_payment < self.principal * self.monthly_rate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RepaymentStrategy {
    /// Smallest outstanding balance first
    Snowball,
    /// Highest interest rate first
    Avalanche,
}

impl std::fmt::Display for RepaymentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepaymentStrategy::Snowball => write!(f, "snowball"),
            RepaymentStrategy::Avalanche => write!(f, "avalanche"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationLimits {
    pub max_months: u32,
}

impl Default for SimulationLimits {
    fn default() -> Self {
        SimulationLimits { max_months: 600 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub month: u32,
    pub total_debt_remaining: Money,
    pub interest_paid_this_month: Money,
    pub paid_this_month: Money,
    /// Debt ranked first for surplus this month
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payoff {
    pub lender: String,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepaymentPlan {
    pub strategy: RepaymentStrategy,
    pub timeline: Vec<TimelineEntry>,
    pub months: u32,
    pub total_interest: Money,
    /// False when the horizon cap was reached with debt outstanding
    pub converged: bool,
    pub payoff_order: Vec<Payoff>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyComparison {
    pub snowball: RepaymentPlan,
    pub avalanche: RepaymentPlan,
    /// Snowball interest minus avalanche interest
    pub interest_saved: Money,
    /// Snowball months minus avalanche months
    pub months_saved: i64,
    pub recommended: RepaymentStrategy,
}

struct Balance<'a> {
    debt: &'a Debt,
    index: usize,
    outstanding: Money,
    paid_off: bool,
}

fn validate(debts: &[Debt], budget: Option<Money>) -> Result<(), InputError> {
    for (idx, debt) in debts.iter().enumerate() {
        ensure_non_negative(format!("debts[{idx}].principal"), debt.principal)?;
        ensure_non_negative(format!("debts[{idx}].annual_rate"), debt.annual_rate)?;
        ensure_non_negative(format!("debts[{idx}].minimum_payment"), debt.minimum_payment)?;
    }
    if let Some(budget) = budget {
        ensure_non_negative("total_monthly_budget", budget)?;
        let minimums: Money = debts
            .iter()
            .filter(|d| d.principal > Decimal::ZERO)
            .map(|d| d.minimum_payment)
            .sum();
        if budget < minimums {
            return Err(InputError::BudgetBelowMinimums { budget, minimums });
        }
    }
    Ok(())
}

fn rank(strategy: RepaymentStrategy, a: &Balance, b: &Balance) -> Ordering {
    let by_balance = a.outstanding.cmp(&b.outstanding);
    let by_rate = b.debt.annual_rate.cmp(&a.debt.annual_rate);
    let primary = match strategy {
        RepaymentStrategy::Snowball => by_balance.then(by_rate),
        RepaymentStrategy::Avalanche => by_rate.then(by_balance),
    };
    primary.then(a.index.cmp(&b.index))
}

/// Simulate repayment month by month.
///
/// Without a budget each month's budget is the sum of the minimum payments
/// of debts still outstanding at the start of that month.
pub fn simulate(
    debts: &[Debt],
    strategy: RepaymentStrategy,
    budget: Option<Money>,
    limits: &SimulationLimits,
) -> Result<RepaymentPlan, InputError> {
    validate(debts, budget)?;

    let mut warnings = Vec::new();
    for debt in debts.iter().filter(|d| d.principal > Decimal::ZERO) {
        if debt.negatively_amortizes() {
            let warning = Warning::NegativeAmortization {
                lender: debt.lender.clone(),
                minimum_payment: debt.minimum_payment,
                monthly_interest: debt.principal * debt.monthly_rate(),
            };
            log::warn!("{}", warning);
            warnings.push(warning);
        }
    }

    let mut balances: Vec<Balance> = debts
        .iter()
        .enumerate()
        .map(|(index, debt)| Balance {
            debt,
            index,
            outstanding: debt.principal,
            paid_off: debt.principal.is_zero(),
        })
        .collect();

    let mut timeline = Vec::new();
    let mut payoff_order = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut month = 0;
    let mut remaining: Money = balances.iter().map(|b| b.outstanding).sum();

    'months: while remaining > Decimal::ZERO && month < limits.max_months {
        let mut available = budget.unwrap_or_else(|| {
            balances
                .iter()
                .filter(|b| !b.paid_off)
                .map(|b| b.debt.minimum_payment)
                .sum()
        });

        let mut interest = Decimal::ZERO;
        for b in balances.iter_mut().filter(|b| !b.paid_off) {
            let accrued = b.outstanding.checked_mul(b.debt.monthly_rate());
            match accrued.and_then(|a| b.outstanding.checked_add(a).map(|total| (a, total))) {
                Some((accrued, total)) => {
                    b.outstanding = total;
                    interest += accrued;
                }
                None => {
                    log::warn!("{} balance overflowed in month {}", b.debt.lender, month + 1);
                    break 'months;
                }
            }
        }
        month += 1;

        let mut paid = Decimal::ZERO;
        for b in balances.iter_mut().filter(|b| !b.paid_off) {
            let payment = b.debt.minimum_payment.min(b.outstanding).min(available);
            b.outstanding -= payment;
            available -= payment;
            paid += payment;
        }

        let mut order: Vec<usize> = (0..balances.len())
            .filter(|&i| balances[i].outstanding > Decimal::ZERO)
            .collect();
        order.sort_by(|&i, &j| rank(strategy, &balances[i], &balances[j]));
        let target = order.first().map(|&i| balances[i].debt.lender.clone());

        for &i in &order {
            if available <= Decimal::ZERO {
                break;
            }
            let b = &mut balances[i];
            let payment = available.min(b.outstanding);
            b.outstanding -= payment;
            available -= payment;
            paid += payment;
        }

        for b in balances
            .iter_mut()
            .filter(|b| !b.paid_off && b.outstanding <= Decimal::ZERO)
        {
            b.outstanding = Decimal::ZERO;
            b.paid_off = true;
            log::debug!("{} paid off in month {}", b.debt.lender, month);
            payoff_order.push(Payoff {
                lender: b.debt.lender.clone(),
                month,
            });
        }

        remaining = balances.iter().map(|b| b.outstanding).sum();
        total_interest += interest;
        timeline.push(TimelineEntry {
            month,
            total_debt_remaining: remaining,
            interest_paid_this_month: interest,
            paid_this_month: paid,
            target,
        });
    }

    let converged = remaining <= Decimal::ZERO;
    if !converged {
        let warning = Warning::NonConvergent {
            months: month,
            remaining,
        };
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    log::info!(
        "{} plan: {} months, total interest {}",
        strategy,
        month,
        total_interest.round_dp(2)
    );

    Ok(RepaymentPlan {
        strategy,
        timeline,
        months: month,
        total_interest,
        converged,
        payoff_order,
        warnings,
    })
}

/// Run both strategies on the same debts and budget. Avalanche is
/// recommended only when it pays strictly less interest.
pub fn compare_strategies(
    debts: &[Debt],
    budget: Option<Money>,
    limits: &SimulationLimits,
) -> Result<StrategyComparison, InputError> {
    let snowball = simulate(debts, RepaymentStrategy::Snowball, budget, limits)?;
    let avalanche = simulate(debts, RepaymentStrategy::Avalanche, budget, limits)?;
    let recommended = if avalanche.total_interest < snowball.total_interest {
        RepaymentStrategy::Avalanche
    } else {
        RepaymentStrategy::Snowball
    };
    Ok(StrategyComparison {
        interest_saved: snowball.total_interest - avalanche.total_interest,
        months_saved: i64::from(snowball.months) - i64::from(avalanche.months),
        recommended,
        snowball,
        avalanche,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn two_debts() -> Vec<Debt> {
        vec![
            Debt::new("A", dec!(10000), dec!(0.24), dec!(500)),
            Debt::new("B", dec!(50000), dec!(0.12), dec!(1200)),
        ]
    }

    #[test]
    fn snowball_targets_smallest_balance_first() {
        let plan = simulate(
            &two_debts(),
            RepaymentStrategy::Snowball,
            None,
            &SimulationLimits::default(),
        )
        .unwrap();
        assert_eq!(plan.timeline[0].target.as_deref(), Some("A"));
        assert!(plan.converged);
        assert_eq!(plan.payoff_order[0].lender, "A");
    }

    #[test]
    fn first_month_accrues_interest_on_both_debts() {
        let plan = simulate(
            &two_debts(),
            RepaymentStrategy::Snowball,
            None,
            &SimulationLimits::default(),
        )
        .unwrap();
        let first = &plan.timeline[0];
        // 10000 * 2% + 50000 * 1%
        assert_eq!(first.interest_paid_this_month, dec!(700));
        assert_eq!(first.paid_this_month, dec!(1700));
        assert_eq!(first.total_debt_remaining, dec!(59000));
    }

    #[test]
    fn avalanche_targets_highest_rate() {
        let debts = vec![
            Debt::new("small-cheap", dec!(5000), dec!(0.10), dec!(200)),
            Debt::new("large-dear", dec!(40000), dec!(0.36), dec!(1500)),
        ];
        let limits = SimulationLimits::default();
        let avalanche =
            simulate(&debts, RepaymentStrategy::Avalanche, Some(dec!(5000)), &limits).unwrap();
        let snowball =
            simulate(&debts, RepaymentStrategy::Snowball, Some(dec!(5000)), &limits).unwrap();
        assert_eq!(avalanche.timeline[0].target.as_deref(), Some("large-dear"));
        assert_eq!(snowball.timeline[0].target.as_deref(), Some("small-cheap"));
        assert!(avalanche.total_interest <= snowball.total_interest);
    }

    #[test]
    fn timeline_never_increases_and_ends_at_zero() {
        let plan = simulate(
            &two_debts(),
            RepaymentStrategy::Avalanche,
            Some(dec!(3000)),
            &SimulationLimits::default(),
        )
        .unwrap();
        let remaining: Vec<_> = plan.timeline.iter().map(|e| e.total_debt_remaining).collect();
        assert!(remaining.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(remaining.last().copied(), Some(dec!(0)));
        assert_eq!(plan.months as usize, plan.timeline.len());
        assert_eq!(
            plan.total_interest,
            plan.timeline.iter().map(|e| e.interest_paid_this_month).sum::<Decimal>()
        );
    }

    #[test]
    fn surplus_cascades_within_month() {
        let debts = vec![
            Debt::new("tiny", dec!(100), dec!(0), dec!(50)),
            Debt::new("big", dec!(1000), dec!(0), dec!(100)),
        ];
        let plan = simulate(
            &debts,
            RepaymentStrategy::Snowball,
            Some(dec!(400)),
            &SimulationLimits::default(),
        )
        .unwrap();
        // minimums 150, surplus 250 clears "tiny" (50 left) then 200 goes to "big"
        assert_eq!(plan.timeline[0].total_debt_remaining, dec!(700));
        assert_eq!(plan.payoff_order[0], Payoff { lender: "tiny".into(), month: 1 });
        assert_eq!(plan.months, 3);
    }

    #[test]
    fn underfunded_debt_is_flagged_and_capped() {
        let debts = vec![Debt::new("card", dec!(100000), dec!(0.36), dec!(1000))];
        let limits = SimulationLimits { max_months: 120 };
        let plan = simulate(&debts, RepaymentStrategy::Avalanche, None, &limits).unwrap();
        assert!(!plan.converged);
        assert_eq!(plan.months, 120);
        assert!(matches!(plan.warnings[0], Warning::NegativeAmortization { .. }));
        assert!(matches!(plan.warnings[1], Warning::NonConvergent { months: 120, .. }));
    }

    #[test]
    fn budget_below_minimums_is_rejected() {
        let err = simulate(
            &two_debts(),
            RepaymentStrategy::Snowball,
            Some(dec!(1000)),
            &SimulationLimits::default(),
        )
        .unwrap_err();
        assert_eq!(err.field(), "total_monthly_budget");
    }

    #[test]
    fn negative_principal_is_rejected() {
        let debts = vec![Debt::new("x", dec!(-5), dec!(0.1), dec!(10))];
        let err = simulate(&debts, RepaymentStrategy::Snowball, None, &SimulationLimits::default())
            .unwrap_err();
        assert_eq!(err.field(), "debts[0].principal");
    }

    #[test]
    fn no_debts_is_an_empty_plan() {
        let plan = simulate(&[], RepaymentStrategy::Snowball, None, &SimulationLimits::default())
            .unwrap();
        assert!(plan.timeline.is_empty());
        assert!(plan.converged);
        assert_eq!(plan.total_interest, dec!(0));
    }

    #[test]
    fn comparison_prefers_avalanche_when_cheaper() {
        let debts = vec![
            Debt::new("small-cheap", dec!(5000), dec!(0.10), dec!(200)),
            Debt::new("large-dear", dec!(40000), dec!(0.36), dec!(1500)),
        ];
        let cmp = compare_strategies(&debts, Some(dec!(5000)), &SimulationLimits::default()).unwrap();
        assert_eq!(cmp.recommended, RepaymentStrategy::Avalanche);
        assert!(cmp.interest_saved > dec!(0));
    }

    #[test]
    fn identical_orderings_recommend_snowball() {
        let debts = vec![Debt::new("only", dec!(10000), dec!(0.12), dec!(1000))];
        let cmp = compare_strategies(&debts, None, &SimulationLimits::default()).unwrap();
        assert_eq!(cmp.interest_saved, dec!(0));
        assert_eq!(cmp.recommended, RepaymentStrategy::Snowball);
    }

    #[test]
    fn debt_kind_parsing_is_lenient() {
        assert_eq!(DebtKind::parse("Credit Card"), DebtKind::CreditCard);
        assert_eq!(DebtKind::parse(""), DebtKind::Loan);
        assert_eq!(DebtKind::parse("bnpl"), DebtKind::Other);
    }
}
