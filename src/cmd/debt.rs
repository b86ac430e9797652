//! Debt command - snowball / avalanche repayment timelines

use super::{format_inr, print_json, print_table, print_warnings, read_input};
use fincalc::core::{
    compare_strategies, read_debts_csv, simulate, Debt, Money, RepaymentPlan, RepaymentStrategy,
    SimulationLimits, Warning,
};
use clap::{Args, ValueEnum};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Debt list document accepted by the debt command
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DebtInput {
    pub debts: Vec<Debt>,
    /// Total paid towards all debts each month
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub monthly_budget: Option<Money>,
}

#[derive(Args, Debug)]
pub struct DebtCommand {
    /// Debts as JSON, or CSV with a .csv extension. Reads JSON from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Repayment strategy
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Compare)]
    strategy: StrategyArg,

    /// Monthly budget across all debts. Defaults to the sum of minimum payments.
    #[arg(short, long)]
    budget: Option<Money>,

    /// Horizon cap in months
    #[arg(long)]
    max_months: Option<u32>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Snowball,
    Avalanche,
    /// Run both and recommend one
    Compare,
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: u32,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Interest")]
    interest: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Focus")]
    target: String,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Months")]
    months: String,
    #[tabled(rename = "Total interest")]
    interest: String,
    #[tabled(rename = "Payoff order")]
    order: String,
}

impl DebtCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (input, mut warnings) = self.read_debts()?;
        let budget = self.budget.or(input.monthly_budget);
        let mut limits = SimulationLimits::default();
        if let Some(max_months) = self.max_months {
            limits.max_months = max_months;
        }
        log::info!("Simulating {} debts", input.debts.len());

        match self.strategy {
            StrategyArg::Compare => {
                let comparison = compare_strategies(&input.debts, budget, &limits)?;
                if self.json {
                    return print_json(&serde_json::json!({
                        "comparison": comparison,
                        "input_warnings": warnings,
                    }));
                }
                println!();
                println!("DEBT REPAYMENT: SNOWBALL vs AVALANCHE");
                println!();
                print_table(vec![
                    plan_row(&comparison.snowball),
                    plan_row(&comparison.avalanche),
                ]);
                println!();
                println!(
                    "Recommended: {} (saves {} interest, {} months)",
                    comparison.recommended,
                    format_inr(comparison.interest_saved),
                    comparison.months_saved
                );
                for warning in comparison
                    .snowball
                    .warnings
                    .iter()
                    .chain(&comparison.avalanche.warnings)
                {
                    if !warnings.contains(warning) {
                        warnings.push(warning.clone());
                    }
                }
                print_warnings(&warnings);
            }
            StrategyArg::Snowball | StrategyArg::Avalanche => {
                let strategy = match self.strategy {
                    StrategyArg::Avalanche => RepaymentStrategy::Avalanche,
                    _ => RepaymentStrategy::Snowball,
                };
                let mut plan = simulate(&input.debts, strategy, budget, &limits)?;
                if self.json {
                    warnings.append(&mut plan.warnings);
                    plan.warnings = warnings;
                    return print_json(&plan);
                }
                print_plan(&plan);
                warnings.extend(plan.warnings.iter().cloned());
                print_warnings(&warnings);
            }
        }
        Ok(())
    }

    /// Debts plus warnings for any CSV rows that were skipped
    fn read_debts(&self) -> anyhow::Result<(DebtInput, Vec<Warning>)> {
        let is_csv = self
            .file
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
        let buffer = read_input(&self.file)?;
        if is_csv {
            let (debts, errors) = read_debts_csv(buffer.as_slice())?;
            let warnings = errors
                .into_iter()
                .map(|e| Warning::RowSkipped {
                    row: e.row,
                    reason: e.kind.to_string(),
                })
                .collect();
            Ok((
                DebtInput {
                    debts,
                    monthly_budget: None,
                },
                warnings,
            ))
        } else {
            Ok((serde_json::from_slice(&buffer)?, Vec::new()))
        }
    }
}

fn plan_row(plan: &RepaymentPlan) -> PlanRow {
    PlanRow {
        strategy: plan.strategy.to_string(),
        months: if plan.converged {
            plan.months.to_string()
        } else {
            format!("{}+", plan.months)
        },
        interest: format_inr(plan.total_interest),
        order: plan
            .payoff_order
            .iter()
            .map(|p| p.lender.as_str())
            .collect::<Vec<_>>()
            .join(" > "),
    }
}

fn print_plan(plan: &RepaymentPlan) {
    println!();
    println!("DEBT REPAYMENT ({})", plan.strategy.to_string().to_uppercase());
    println!();
    print_table(
        plan.timeline
            .iter()
            .map(|entry| MonthRow {
                month: entry.month,
                paid: format_inr(entry.paid_this_month),
                interest: format_inr(entry.interest_paid_this_month),
                remaining: format_inr(entry.total_debt_remaining),
                target: entry.target.clone().unwrap_or_default(),
            })
            .collect(),
    );
    println!();
    print_table(vec![plan_row(plan)]);
}
