use super::{Debt, DebtKind};
use crate::core::table::{amount_field, required, RawTable, RowError, RowErrorKind};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// A debt list export row. `interest_rate` is an annual percentage.
#[derive(Debug, Deserialize)]
struct DebtRow {
    lender: Option<String>,
    principal: Option<String>,
    interest_rate: Option<String>,
    emi: Option<String>,
    minimum_payment: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl TryFrom<DebtRow> for Debt {
    type Error = RowErrorKind;

    fn try_from(row: DebtRow) -> Result<Self, Self::Error> {
        let lender = required("lender", &row.lender)?.to_string();
        let principal = amount_field("principal", &row.principal)?;
        let rate_percent = amount_field("interest_rate", &row.interest_rate)?;
        let minimum_payment = match (&row.emi, &row.minimum_payment) {
            (Some(emi), _) if !emi.trim().is_empty() => amount_field("emi", &row.emi)?,
            _ => amount_field("minimum_payment", &row.minimum_payment)?,
        };
        for (column, value) in [
            ("principal", principal),
            ("interest_rate", rate_percent),
            ("emi", minimum_payment),
        ] {
            if value < Decimal::ZERO {
                return Err(RowErrorKind::Malformed {
                    reason: format!("{column} must not be negative"),
                });
            }
        }
        Ok(Debt {
            lender,
            principal,
            annual_rate: rate_percent / Decimal::ONE_HUNDRED,
            minimum_payment,
            kind: row.kind.as_deref().map(DebtKind::parse).unwrap_or_default(),
        })
    }
}

/// Read debts from a CSV export with columns
/// `lender, principal, interest_rate, emi|minimum_payment[, type]`.
///
/// Rows that fail to parse are returned alongside the debts that did.
pub fn read_debts_csv<R: Read>(reader: R) -> Result<(Vec<Debt>, Vec<RowError>), csv::Error> {
    let table = RawTable::from_csv(reader)?;
    let mut debts = Vec::new();
    let mut errors = Vec::new();
    for (row, parsed) in table.deserialize::<DebtRow>() {
        match parsed.and_then(Debt::try_from) {
            Ok(debt) => debts.push(debt),
            Err(kind) => {
                let error = RowError { row, kind };
                log::warn!("Skipping debt {}", error);
                errors.push(error);
            }
        }
    }
    log::info!("Read {} debts ({} rows skipped)", debts.len(), errors.len());
    Ok((debts, errors))
}
