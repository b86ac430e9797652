//! Gains command - broker export ingestion, FIFO classification and tax estimate

use super::{format_inr, print_json, print_table, print_warnings, read_input, read_rules};
use fincalc::core::{
    aggregate, classify, estimate_tax, ingest, BrokerSource, CapitalGainsRules, FiscalYear,
    GainRecord, GainsSummary, GainsTaxEstimate, RawTable, TaxRules, Trade, Warning,
};
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct GainsCommand {
    /// Broker CSV export. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Export format (zerodha, groww, upstox, taxwise, cleartax, generic). Detected from headers if not given.
    #[arg(short, long)]
    source: Option<BrokerSource>,

    /// Only report gains realised in this fiscal year (e.g., 2025 for FY 2024-25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Capital gains rules JSON replacing the built-in rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GainsOutput {
    source: BrokerSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    fiscal_year: Option<FiscalYear>,
    trades: Vec<Trade>,
    records: Vec<GainRecord>,
    summary: GainsSummary,
    tax: GainsTaxEstimate,
    warnings: Vec<Warning>,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Sold")]
    sold: String,
    #[tabled(rename = "Bought")]
    bought: String,
    #[tabled(rename = "Instrument")]
    instrument: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Buy")]
    buy_price: String,
    #[tabled(rename = "Sell")]
    sell_price: String,
    #[tabled(rename = "Gain/Loss")]
    gain: String,
    #[tabled(rename = "Days")]
    days: i64,
    #[tabled(rename = "Term")]
    term: String,
}

#[derive(Tabled)]
struct TaxRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Short term")]
    short_term: String,
    #[tabled(rename = "ST tax")]
    short_term_tax: String,
    #[tabled(rename = "Long term")]
    long_term: String,
    #[tabled(rename = "Exempt")]
    exempt: String,
    #[tabled(rename = "LT tax")]
    long_term_tax: String,
}

impl GainsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let buffer = read_input(&self.file)?;
        let table = RawTable::from_csv(buffer.as_slice())
            .with_context(|| format!("reading {}", self.file.display()))?;
        let fiscal_year = self.year.map(FiscalYear);
        let default_rules = TaxRules::for_year(
            fiscal_year
                .unwrap_or_else(|| FiscalYear::from_date(chrono::Local::now().date_naive())),
        )
        .capital_gains;
        let rules: CapitalGainsRules = read_rules(self.rules.as_deref(), default_rules)?;

        let ingestion = ingest(&table, self.source);
        let classification = classify(&ingestion.trades, &rules.holding_periods);

        let records: Vec<GainRecord> = classification
            .records
            .into_iter()
            .filter(|r| fiscal_year.map_or(true, |fy| fy.contains(r.trade_date)))
            .collect();
        let summary = aggregate(&records);
        let tax = estimate_tax(&summary, &rules);

        let warnings: Vec<Warning> = ingestion
            .row_errors
            .iter()
            .map(|e| Warning::RowSkipped {
                row: e.row,
                reason: e.kind.to_string(),
            })
            .chain(classification.unmatched.iter().map(|u| Warning::UnmatchedSell {
                instrument: u.instrument.clone(),
                trade_date: u.trade_date,
                quantity: u.quantity,
            }))
            .chain(classification.invalid.iter().map(|e| Warning::InvalidTrade {
                instrument: e.instrument.clone(),
                trade_date: e.trade_date,
                reason: e.reason.clone(),
            }))
            .collect();

        let output = GainsOutput {
            source: ingestion.source,
            fiscal_year,
            trades: ingestion.trades,
            records,
            summary,
            tax,
            warnings,
        };
        if self.json {
            print_json(&output)
        } else {
            print_report(&output);
            Ok(())
        }
    }
}

fn print_report(output: &GainsOutput) {
    let period = output
        .fiscal_year
        .map_or("All Years".to_string(), |fy| fy.to_string());
    println!();
    println!(
        "CAPITAL GAINS ({}) - {} export, {} trades",
        period,
        output.source,
        output.trades.len()
    );
    println!();
    if output.records.is_empty() {
        println!("No realised gains");
    } else {
        print_table(
            output
                .records
                .iter()
                .map(|r| RecordRow {
                    sold: r.trade_date.to_string(),
                    bought: r.buy_date.to_string(),
                    instrument: r.instrument.clone(),
                    class: r.instrument_class.to_string(),
                    quantity: r.quantity.normalize().to_string(),
                    buy_price: format_inr(r.buy_price),
                    sell_price: format_inr(r.sell_price),
                    gain: format_inr(r.gain_loss),
                    days: r.holding_period_days,
                    term: r.term.to_string(),
                })
                .collect(),
        );
    }

    let summary = &output.summary;
    println!();
    println!(
        "Short term: {} ({} records)",
        format_inr(summary.short_term_gain),
        summary.short_term_count
    );
    println!(
        "Long term:  {} ({} records)",
        format_inr(summary.long_term_gain),
        summary.long_term_count
    );
    println!("Total:      {}", format_inr(summary.total_gain));

    if !output.tax.lines.is_empty() {
        let slab = "at slab".to_string();
        println!();
        println!("ESTIMATED TAX");
        println!();
        print_table(
            output
                .tax
                .lines
                .iter()
                .map(|line| TaxRow {
                    class: line.class.to_string(),
                    short_term: format_inr(line.short_term_gain),
                    short_term_tax: line.short_term_tax.map_or(slab.clone(), format_inr),
                    long_term: format_inr(line.long_term_gain),
                    exempt: format_inr(line.exemption_used),
                    long_term_tax: line.long_term_tax.map_or(slab.clone(), format_inr),
                })
                .collect(),
        );
        println!();
        println!("Tax on gains: {}", format_inr(output.tax.total_tax));
        if !output.tax.slab_taxable.is_zero() {
            println!(
                "Add {} to income taxed at slab rates",
                format_inr(output.tax.slab_taxable)
            );
        }
    }

    print_warnings(&output.warnings);
}
