//! Schema command - print expected input formats

use super::debt::DebtInput;
use fincalc::core::{CreditProfile, TaxProfile};
use clap::{Args, ValueEnum};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Input document to describe
    #[arg(value_enum)]
    kind: SchemaKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchemaKind {
    /// Tax profile for the tax command
    Tax,
    /// Credit profile for the credit command
    Credit,
    /// Debt list for the debt command
    Debt,
    /// CSV header accepted by the debt command
    DebtCsv,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = match self.kind {
            SchemaKind::Tax => schema_for!(TaxProfile),
            SchemaKind::Credit => schema_for!(CreditProfile),
            SchemaKind::Debt => schema_for!(DebtInput),
            SchemaKind::DebtCsv => {
                println!("{}", DEBT_CSV_COLUMNS.join(","));
                return Ok(());
            }
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

const DEBT_CSV_COLUMNS: &[&str] = &["lender", "principal", "interest_rate", "emi", "type"];
