//! Broker export adapters.
//!
//! Each supported export is recognised by a set of header columns. Formats are
//! tried in [`FORMATS`] order and the first whose signature is fully present
//! wins; anything else goes to the [`generic`] column-synonym mapper.

mod cleartax;
mod generic;
mod groww;
mod taxwise;
mod upstox;
mod zerodha;

use crate::core::gains::{InstrumentClass, Trade, TradeKind};
use crate::core::money::Money;
use crate::core::table::{RawTable, RowError, RowErrorKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerSource {
    Zerodha,
    Groww,
    Upstox,
    Taxwise,
    Cleartax,
    Generic,
}

impl BrokerSource {
    pub fn name(&self) -> &'static str {
        match self {
            BrokerSource::Zerodha => "zerodha",
            BrokerSource::Groww => "groww",
            BrokerSource::Upstox => "upstox",
            BrokerSource::Taxwise => "taxwise",
            BrokerSource::Cleartax => "cleartax",
            BrokerSource::Generic => "generic",
        }
    }
}

impl std::fmt::Display for BrokerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BrokerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zerodha" | "kite" => Ok(BrokerSource::Zerodha),
            "groww" => Ok(BrokerSource::Groww),
            "upstox" => Ok(BrokerSource::Upstox),
            "taxwise" => Ok(BrokerSource::Taxwise),
            "cleartax" => Ok(BrokerSource::Cleartax),
            "generic" => Ok(BrokerSource::Generic),
            other => Err(format!("unknown broker source '{other}'")),
        }
    }
}

/// Parsed rows of one export: the trades and the rows that were skipped.
type Parsed = (Vec<Trade>, Vec<RowError>);

/// A recognised export format: its header signature and its row parser.
pub struct BrokerFormat {
    pub source: BrokerSource,
    pub signature: &'static [&'static str],
    parse: fn(&RawTable) -> Parsed,
}

impl BrokerFormat {
    pub fn matches(&self, table: &RawTable) -> bool {
        self.signature.iter().all(|column| table.has_column(column))
    }
}

pub const FORMATS: &[BrokerFormat] = &[
    BrokerFormat {
        source: BrokerSource::Zerodha,
        signature: &["trade_date", "isin"],
        parse: parse_rows::<zerodha::Record>,
    },
    BrokerFormat {
        source: BrokerSource::Groww,
        signature: &["transaction_date", "security_name"],
        parse: parse_rows::<groww::Record>,
    },
    BrokerFormat {
        source: BrokerSource::Upstox,
        signature: &["sell_date", "symbol"],
        parse: parse_rows::<upstox::Record>,
    },
    BrokerFormat {
        source: BrokerSource::Taxwise,
        signature: &["acquisition_date", "sale_date"],
        parse: parse_rows::<taxwise::Record>,
    },
    BrokerFormat {
        source: BrokerSource::Cleartax,
        signature: &["buy_date", "sell_date"],
        parse: parse_rows::<cleartax::Record>,
    },
];

/// Trades and skipped rows from one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingestion {
    pub source: BrokerSource,
    pub trades: Vec<Trade>,
    pub row_errors: Vec<RowError>,
}

/// First format whose header signature the table carries.
pub fn detect_source(table: &RawTable) -> BrokerSource {
    FORMATS
        .iter()
        .find(|format| format.matches(table))
        .map(|format| format.source)
        .unwrap_or(BrokerSource::Generic)
}

/// Normalize an export into canonical trades.
///
/// With a `hint` the detection step is skipped. Bad rows never fail the
/// ingestion; they are collected into `row_errors`.
pub fn ingest(table: &RawTable, hint: Option<BrokerSource>) -> Ingestion {
    let source = hint.unwrap_or_else(|| detect_source(table));
    let (trades, row_errors) = match FORMATS.iter().find(|format| format.source == source) {
        Some(format) => (format.parse)(table),
        None => generic::parse(table),
    };
    for error in &row_errors {
        log::warn!("{} export {}", source, error);
    }
    log::info!(
        "Ingested {} trades from {} export ({} rows skipped)",
        trades.len(),
        source,
        row_errors.len()
    );
    Ingestion {
        source,
        trades,
        row_errors,
    }
}

/// A deserialized export row that yields one or more trades.
trait BrokerRecord: DeserializeOwned {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind>;
}

fn parse_rows<R: BrokerRecord>(table: &RawTable) -> Parsed {
    let mut trades = Vec::new();
    let mut errors = Vec::new();
    for (row, parsed) in table.deserialize::<R>() {
        match parsed.and_then(R::into_trades) {
            Ok(mut t) => trades.append(&mut t),
            Err(kind) => errors.push(RowError { row, kind }),
        }
    }
    (trades, errors)
}

/// Upper-case symbol without exchange prefix or equity series suffix:
/// `NSE:INFY-EQ` and `infy` both become `INFY`.
pub fn normalize_instrument(raw: &str) -> String {
    let mut name = raw.trim().to_uppercase();
    if let Some((_, rest)) = name.split_once('|') {
        name = rest.trim().to_string();
    }
    for prefix in ["NSE:", "BSE:"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.trim().to_string();
        }
    }
    for suffix in ["-EQ", "-BE"] {
        if let Some(rest) = name.strip_suffix(suffix) {
            name = rest.trim().to_string();
        }
    }
    name
}

/// Class from an explicit label column, else guessed from the instrument name.
fn instrument_class(instrument: &str, label: &Option<String>) -> InstrumentClass {
    label
        .as_deref()
        .and_then(InstrumentClass::parse)
        .unwrap_or_else(|| InstrumentClass::infer(instrument))
}

fn non_negative_price(column: &str, price: Money) -> Result<Money, RowErrorKind> {
    if price < Decimal::ZERO {
        return Err(RowErrorKind::Malformed {
            reason: format!("'{column}' must not be negative (got {price})"),
        });
    }
    Ok(price)
}

/// A realised-gain row: one closed position becomes a buy and a sell.
struct ClosedPosition {
    instrument: String,
    class: InstrumentClass,
    buy_date: NaiveDate,
    sell_date: NaiveDate,
    quantity: Decimal,
    buy_price: Money,
    sell_price: Money,
}

impl ClosedPosition {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind> {
        if self.sell_date < self.buy_date {
            return Err(RowErrorKind::SellBeforeBuy {
                buy_date: self.buy_date,
                sell_date: self.sell_date,
            });
        }
        let buy_price = non_negative_price("buy_price", self.buy_price)?;
        let sell_price = non_negative_price("sell_price", self.sell_price)?;
        let trade = |trade_date, kind, price| Trade {
            trade_date,
            instrument: self.instrument.clone(),
            instrument_class: self.class,
            kind,
            quantity: self.quantity,
            price,
        };
        Ok(vec![
            trade(self.buy_date, TradeKind::Buy, buy_price),
            trade(self.sell_date, TradeKind::Sell, sell_price),
        ])
    }
}
