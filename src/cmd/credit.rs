//! Credit command - synthetic score, factor breakdown and recommendations

use super::{format_inr, format_percent, print_json, print_table, print_warnings, read_json, read_rules};
use fincalc::core::{loan_eligibility, CreditProfile, LoanEligibility, Money, ScoreReport, ScoringRules};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct CreditCommand {
    /// Credit profile JSON (accounts and inquiries). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    profile: PathBuf,

    /// Date to score as of (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Monthly income, to estimate loan eligibility
    #[arg(long)]
    monthly_income: Option<Money>,

    /// Scoring rules JSON replacing the built-in rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CreditOutput<'a> {
    as_of: NaiveDate,
    report: &'a ScoreReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    loan_eligibility: Option<&'a LoanEligibility>,
}

#[derive(Tabled)]
struct FactorRow {
    #[tabled(rename = "Factor")]
    factor: &'static str,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Points lost")]
    points_lost: i32,
    #[tabled(rename = "Sub-score")]
    sub_score: u32,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Recommendation")]
    title: String,
    #[tabled(rename = "Expected gain")]
    gain: String,
    #[tabled(rename = "Timeframe")]
    timeframe: String,
}

impl CreditCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let profile: CreditProfile = read_json(&self.profile)?;
        let rules = read_rules(self.rules.as_deref(), ScoringRules::default())?;
        let as_of = self
            .as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let report = profile.score(as_of, &rules)?;
        let eligibility = self
            .monthly_income
            .map(|income| loan_eligibility(report.score, income, &rules))
            .transpose()?;

        if self.json {
            print_json(&CreditOutput {
                as_of,
                report: &report,
                loan_eligibility: eligibility.as_ref(),
            })
        } else {
            print_report(as_of, &report, eligibility.as_ref());
            Ok(())
        }
    }
}

fn print_report(as_of: NaiveDate, report: &ScoreReport, eligibility: Option<&LoanEligibility>) {
    println!();
    println!("CREDIT SCORE as of {}: {} ({})", as_of, report.score, report.band);
    println!();
    print_table(
        report
            .factors
            .iter()
            .map(|f| FactorRow {
                factor: f.factor.name(),
                weight: format_percent(f.weight),
                points_lost: f.points_lost,
                sub_score: f.sub_score,
                status: f.status.to_string(),
            })
            .collect(),
    );

    println!();
    println!("RECOMMENDATIONS");
    println!();
    print_table(
        report
            .recommendations
            .iter()
            .map(|r| RecommendationRow {
                title: r.title.clone(),
                gain: format!("+{}", r.expected_point_gain),
                timeframe: match r.timeframe_months {
                    0 => "ongoing".to_string(),
                    months => format!("{months} months"),
                },
            })
            .collect(),
    );
    for rec in &report.recommendations {
        println!("  {}: {}", rec.title, rec.description);
    }

    if let Some(eligibility) = eligibility {
        println!();
        if eligibility.eligible {
            println!(
                "Loan eligibility: up to {} ({}x monthly income) at about {}",
                format_inr(eligibility.max_loan_amount),
                eligibility.income_multiple,
                eligibility
                    .estimated_interest_rate
                    .map(format_percent)
                    .unwrap_or_default()
            );
        } else {
            println!("Loan eligibility: not eligible at score {}", eligibility.score);
        }
    }

    print_warnings(&report.warnings);
}
