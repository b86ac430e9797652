//! Raw tabular input (CSV exports) and row-level errors.

use super::dates::parse_date;
use super::money::parse_amount;
use chrono::NaiveDate;
use csv::{ByteRecord, StringRecord};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use thiserror::Error;

/// Why a single input row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowErrorKind {
    #[error("missing value for '{column}'")]
    Missing { column: String },

    #[error("unparseable date '{value}' in '{column}'")]
    InvalidDate { column: String, value: String },

    #[error("non-numeric value '{value}' in '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("'{column}' must be positive (got {value})")]
    NotPositive { column: String, value: Decimal },

    #[error("unknown trade type '{value}'")]
    UnknownTradeType { value: String },

    #[error("sell date {sell_date} is before buy date {buy_date}")]
    SellBeforeBuy {
        buy_date: NaiveDate,
        sell_date: NaiveDate,
    },

    #[error("malformed row: {reason}")]
    Malformed { reason: String },
}

/// A skipped row. `row` is the 1-based data row number (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("row {row}: {kind}")]
pub struct RowError {
    pub row: usize,
    pub kind: RowErrorKind,
}

/// Header-normalized table of string cells.
///
/// Headers are trimmed, lower-cased, and spaces, hyphens, dots and slashes
/// become underscores, so `Trade Date`, `trade-date` and `TRADE_DATE` all
/// read as `trade_date`.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl RawTable {
    /// Build from rows already split into cells.
    pub fn new<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers = headers
            .into_iter()
            .map(|h| normalize_header(h.as_ref()))
            .collect::<StringRecord>();
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_ref().trim().to_string())
                    .collect::<StringRecord>()
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Read a CSV export. Rows with a different number of cells than the
    /// header are kept and fail individually later. Cells that are not valid
    /// UTF-8 are read as Latin-1, which is how many Indian broker exports are
    /// saved, so a stray byte never costs the rest of the file.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = decode_record(rdr.byte_headers()?, 0)
            .iter()
            .map(normalize_header)
            .collect::<StringRecord>();
        let mut rows = Vec::new();
        for (idx, record) in rdr.byte_records().enumerate() {
            let row = decode_record(&record?, idx + 1);
            if !row.iter().all(str::is_empty) {
                rows.push(row);
            }
        }
        log::info!("Read {} csv rows", rows.len());
        Ok(RawTable { headers, rows })
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First header found among `candidates`, in candidate order.
    pub fn find_column(&self, candidates: &[&'static str]) -> Option<(&'static str, usize)> {
        candidates
            .iter()
            .find_map(|c| self.column_index(c).map(|idx| (*c, idx)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with their 1-based data row numbers.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.rows.iter().enumerate().map(|(idx, row)| (idx + 1, row))
    }

    /// Deserialize every row into `T` by header name.
    pub fn deserialize<T: DeserializeOwned>(
        &self,
    ) -> impl Iterator<Item = (usize, Result<T, RowErrorKind>)> + '_ {
        self.rows().map(move |(row, record)| {
            let parsed = record
                .deserialize::<T>(Some(&self.headers))
                .map_err(|e| RowErrorKind::Malformed {
                    reason: e.to_string(),
                });
            (row, parsed)
        })
    }
}

fn decode_record(record: &ByteRecord, row: usize) -> StringRecord {
    record
        .iter()
        .map(|cell| match std::str::from_utf8(cell) {
            Ok(text) => text.trim().to_string(),
            Err(_) => {
                log::debug!("row {}: decoding non UTF-8 cell as Latin-1", row);
                cell.iter().map(|&b| char::from(b)).collect::<String>().trim().to_string()
            }
        })
        .collect()
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '-' | '/' | '.' => '_',
            other => other,
        })
        .collect::<String>()
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Non-blank cell value or a `Missing` error naming the column.
pub(crate) fn required<'a>(column: &str, value: &'a Option<String>) -> Result<&'a str, RowErrorKind> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RowErrorKind::Missing {
            column: column.to_string(),
        }),
    }
}

pub(crate) fn date_field(column: &str, value: &Option<String>) -> Result<NaiveDate, RowErrorKind> {
    let raw = required(column, value)?;
    parse_date(raw).ok_or_else(|| RowErrorKind::InvalidDate {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

pub(crate) fn amount_field(column: &str, value: &Option<String>) -> Result<Decimal, RowErrorKind> {
    let raw = required(column, value)?;
    parse_amount(raw).ok_or_else(|| RowErrorKind::InvalidNumber {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

pub(crate) fn positive_field(column: &str, value: &Option<String>) -> Result<Decimal, RowErrorKind> {
    let amount = amount_field(column, value)?;
    if amount <= Decimal::ZERO {
        return Err(RowErrorKind::NotPositive {
            column: column.to_string(),
            value: amount,
        });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header(" Trade Date "), "trade_date");
        assert_eq!(normalize_header("Buy/Sell"), "buy_sell");
        assert_eq!(normalize_header("\u{feff}Symbol"), "symbol");
        assert_eq!(normalize_header("Avg. Price"), "avg_price");
        assert_eq!(normalize_header("P & L"), "p_&_l");
        assert_eq!(normalize_header("sell-date"), "sell_date");
    }

    #[test]
    fn reads_csv_with_ragged_and_blank_rows() {
        let data = "Symbol,Qty\nINFY,10\n,\nTCS\n";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("qty"));
        assert_eq!(table.find_column(&["quantity", "qty"]), Some(("qty", 1)));
    }

    #[test]
    fn invalid_utf8_row_does_not_lose_the_file() {
        let mut data = b"Symbol,Qty\nINFY,10\n".to_vec();
        data.extend_from_slice(b"CAF\xc9 \xff\xfe,5\n");
        data.extend_from_slice(b"TCS,3\n");
        let table = RawTable::from_csv(data.as_slice()).unwrap();

        assert_eq!(table.len(), 3);
        let symbols: Vec<_> = table.rows().map(|(_, r)| r.get(0).unwrap_or("")).collect();
        assert_eq!(symbols, vec!["INFY", "CAF\u{c9} \u{ff}\u{fe}", "TCS"]);
        let (row, last) = table.rows().last().unwrap();
        assert_eq!(row, 3);
        assert_eq!(last.get(1), Some("3"));
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        symbol: Option<String>,
        qty: Option<String>,
    }

    #[test]
    fn deserializes_rows_by_header() {
        let table = RawTable::new(["Symbol", "Qty"], vec![vec!["INFY", "10"]]);
        let rows: Vec<_> = table.deserialize::<Row>().collect();
        assert_eq!(rows.len(), 1);
        let (row, parsed) = &rows[0];
        assert_eq!(*row, 1);
        let parsed = parsed.as_ref().unwrap();
        assert_eq!(parsed.symbol.as_deref(), Some("INFY"));
        assert_eq!(parsed.qty.as_deref(), Some("10"));
    }

    #[test]
    fn field_helpers_report_column() {
        assert_eq!(
            required("symbol", &Some("  ".into())),
            Err(RowErrorKind::Missing {
                column: "symbol".into()
            })
        );
        assert_eq!(
            amount_field("qty", &Some("ten".into())),
            Err(RowErrorKind::InvalidNumber {
                column: "qty".into(),
                value: "ten".into()
            })
        );
        assert_eq!(
            positive_field("qty", &Some("0".into())),
            Err(RowErrorKind::NotPositive {
                column: "qty".into(),
                value: dec!(0)
            })
        );
        assert!(matches!(
            date_field("date", &Some("31/31/2024".into())),
            Err(RowErrorKind::InvalidDate { .. })
        ));
    }
}
