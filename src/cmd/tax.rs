//! Tax command - old vs new regime comparison and advance tax

use super::{format_inr, print_json, print_table, print_warnings, read_json, read_rules};
use fincalc::core::{compare, tax_saving_tips, FiscalYear, TaxComparison, TaxProfile, TaxRules, TaxSavingTip};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct TaxCommand {
    /// Tax profile JSON. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    profile: PathBuf,

    /// Fiscal year by its ending year (e.g., 2025 for FY 2024-25). Defaults to the current one.
    #[arg(short, long)]
    year: Option<i32>,

    /// Rule table JSON replacing the built-in table for the year
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct TaxOutput<'a> {
    comparison: &'a TaxComparison,
    tips: &'a [TaxSavingTip],
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "")]
    item: &'static str,
    #[tabled(rename = "Old regime")]
    old: String,
    #[tabled(rename = "New regime")]
    new: String,
}

#[derive(Tabled)]
struct InstallmentRow {
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Cumulative")]
    cumulative: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct TipRow {
    #[tabled(rename = "Section")]
    code: String,
    #[tabled(rename = "Suggestion")]
    title: String,
    #[tabled(rename = "Potential saving")]
    saving: String,
}

impl TaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let profile: TaxProfile = read_json(&self.profile)?;
        let year = self
            .year
            .map(FiscalYear)
            .unwrap_or_else(|| FiscalYear::from_date(chrono::Local::now().date_naive()));
        let rules = read_rules(self.rules.as_deref(), TaxRules::for_year(year))?;
        log::info!("Comparing regimes for {}", rules.fiscal_year);

        let comparison = compare(&profile, &rules)?;
        let tips = tax_saving_tips(&profile, &rules);

        if self.json {
            print_json(&TaxOutput {
                comparison: &comparison,
                tips: &tips,
            })
        } else {
            self.print_report(&comparison, &tips);
            Ok(())
        }
    }

    fn print_report(&self, comparison: &TaxComparison, tips: &[TaxSavingTip]) {
        let old = &comparison.old_regime;
        let new = &comparison.new_regime;

        println!();
        println!("TAX REGIME COMPARISON ({})", comparison.fiscal_year);
        println!();
        let row = |item, old, new| ComparisonRow {
            item,
            old: format_inr(old),
            new: format_inr(new),
        };
        print_table(vec![
            row("Deductions", old.deductions_claimed, new.deductions_claimed),
            row("Taxable income", old.taxable_income, new.taxable_income),
            row("Slab tax", old.base_tax, new.base_tax),
            row("Rebate (87A)", old.rebate, new.rebate),
            row("Surcharge", old.surcharge, new.surcharge),
            row("Cess", old.cess, new.cess),
            row("Tax payable", old.tax_payable, new.tax_payable),
        ]);
        println!();
        println!(
            "Recommended: {} regime (saves {})",
            comparison.recommended_regime,
            format_inr(comparison.savings)
        );

        println!();
        println!("ADVANCE TAX");
        println!();
        print_table(
            comparison
                .advance_tax_schedule
                .iter()
                .map(|i| InstallmentRow {
                    due: i.due_date.format("%d %b %Y").to_string(),
                    cumulative: super::format_percent(i.cumulative_percent),
                    amount: format_inr(i.amount),
                })
                .collect(),
        );

        if !tips.is_empty() {
            println!();
            println!("TAX SAVING TIPS (old regime)");
            println!();
            print_table(
                tips.iter()
                    .map(|t| TipRow {
                        code: t.code.to_string(),
                        title: t.title.clone(),
                        saving: format_inr(t.potential_saving),
                    })
                    .collect(),
            );
        }

        print_warnings(&comparison.warnings);
    }
}
