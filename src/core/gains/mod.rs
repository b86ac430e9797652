//! Capital gains: FIFO lot matching, short/long term classification and totals.

mod classify;
mod summary;

pub use classify::{classify, Classification};
pub use summary::{
    aggregate, estimate_tax, CapitalGainsRules, ClassTaxLine, ClassTaxRates, ClassTotals,
    GainsSummary, GainsTaxEstimate,
};

use crate::core::money::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    #[default]
    Equity,
    MutualFund,
    Debt,
    Crypto,
}

const CRYPTO_TICKERS: &[&str] = &["BTC", "ETH", "USDT", "BNB", "SOL", "XRP", "DOGE", "MATIC", "ADA"];

impl InstrumentClass {
    pub const ALL: [InstrumentClass; 4] = [
        InstrumentClass::Equity,
        InstrumentClass::MutualFund,
        InstrumentClass::Debt,
        InstrumentClass::Crypto,
    ];

    /// Explicit class label as written in broker exports
    pub fn parse(raw: &str) -> Option<InstrumentClass> {
        match raw.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "equity" | "eq" | "stock" | "stocks" | "shares" | "etf" => Some(InstrumentClass::Equity),
            "mutual_fund" | "mf" | "mutual_funds" | "fund" => Some(InstrumentClass::MutualFund),
            "debt" | "bond" | "bonds" | "debt_fund" | "ncd" | "gsec" => Some(InstrumentClass::Debt),
            "crypto" | "cryptocurrency" | "vda" => Some(InstrumentClass::Crypto),
            _ => None,
        }
    }

    /// Best guess from an instrument name when the export has no class column
    pub fn infer(instrument: &str) -> InstrumentClass {
        let name = instrument.to_uppercase();
        let words: Vec<&str> = name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |w: &str| words.iter().any(|word| *word == w);

        if words.first().map_or(false, |w| CRYPTO_TICKERS.contains(w))
            && (words.len() == 1 || has("INR") || has("USDT"))
        {
            InstrumentClass::Crypto
        } else if has("BOND") || has("BONDS") || has("NCD") || has("GILT") || has("DEBT") || has("LIQUID") {
            InstrumentClass::Debt
        } else if has("FUND") || has("MF") {
            InstrumentClass::MutualFund
        } else {
            InstrumentClass::Equity
        }
    }
}

impl std::fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstrumentClass::Equity => "Equity",
            InstrumentClass::MutualFund => "Mutual fund",
            InstrumentClass::Debt => "Debt",
            InstrumentClass::Crypto => "Crypto",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
}

impl TradeKind {
    pub fn parse(raw: &str) -> Option<TradeKind> {
        match raw.trim().to_lowercase().as_str() {
            "buy" | "b" | "purchase" | "bought" => Some(TradeKind::Buy),
            "sell" | "s" | "sale" | "sold" | "redeem" | "redemption" => Some(TradeKind::Sell),
            _ => None,
        }
    }
}

/// Canonical trade, whatever export it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_date: NaiveDate,
    pub instrument: String,
    pub instrument_class: InstrumentClass,
    pub kind: TradeKind,
    pub quantity: Decimal,
    pub price: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Short,
    Long,
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Short => write!(f, "Short"),
            Term::Long => write!(f, "Long"),
        }
    }
}

/// A sold quantity matched against one buy lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GainRecord {
    /// Sell date
    pub trade_date: NaiveDate,
    pub buy_date: NaiveDate,
    pub instrument: String,
    pub instrument_class: InstrumentClass,
    pub quantity: Decimal,
    pub buy_price: Money,
    pub sell_price: Money,
    pub gain_loss: Money,
    pub holding_period_days: i64,
    pub term: Term,
}

/// Days an instrument must be held beyond to count as long term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingPeriods {
    pub equity: i64,
    pub mutual_fund: i64,
    pub debt: i64,
    pub crypto: i64,
}

impl Default for HoldingPeriods {
    fn default() -> Self {
        HoldingPeriods {
            equity: 365,
            mutual_fund: 365,
            debt: 1095,
            crypto: 1095,
        }
    }
}

impl HoldingPeriods {
    pub fn threshold(&self, class: InstrumentClass) -> i64 {
        match class {
            InstrumentClass::Equity => self.equity,
            InstrumentClass::MutualFund => self.mutual_fund,
            InstrumentClass::Debt => self.debt,
            InstrumentClass::Crypto => self.crypto,
        }
    }

    pub fn term(&self, class: InstrumentClass, holding_period_days: i64) -> Term {
        if holding_period_days > self.threshold(class) {
            Term::Long
        } else {
            Term::Short
        }
    }
}

/// A trade left out of lot matching because its quantity or price is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind:?} of {quantity} {instrument} on {trade_date} ignored: {reason}")]
pub struct InvalidTradeError {
    pub instrument: String,
    pub trade_date: NaiveDate,
    pub kind: TradeKind,
    pub quantity: Decimal,
    pub reason: String,
}

/// A sell (or the part of it) with no open buy lot to match.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("no buy lot for {quantity} {instrument} sold on {trade_date}")]
pub struct UnmatchedSellError {
    pub instrument: String,
    pub trade_date: NaiveDate,
    pub quantity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_class_from_name() {
        assert_eq!(InstrumentClass::infer("INFY"), InstrumentClass::Equity);
        assert_eq!(
            InstrumentClass::infer("Parag Parikh Flexi Cap Fund - Direct Growth"),
            InstrumentClass::MutualFund
        );
        assert_eq!(InstrumentClass::infer("HDFC Liquid Fund"), InstrumentClass::Debt);
        assert_eq!(InstrumentClass::infer("BTC"), InstrumentClass::Crypto);
        assert_eq!(InstrumentClass::infer("ETH/INR"), InstrumentClass::Crypto);
        assert_eq!(InstrumentClass::infer("GOLDBEES"), InstrumentClass::Equity);
    }

    #[test]
    fn parses_class_labels() {
        assert_eq!(InstrumentClass::parse("Mutual Fund"), Some(InstrumentClass::MutualFund));
        assert_eq!(InstrumentClass::parse("EQ"), Some(InstrumentClass::Equity));
        assert_eq!(InstrumentClass::parse("F&O"), None);
    }

    #[test]
    fn long_term_only_beyond_threshold() {
        let periods = HoldingPeriods::default();
        assert_eq!(periods.term(InstrumentClass::Equity, 365), Term::Short);
        assert_eq!(periods.term(InstrumentClass::Equity, 366), Term::Long);
        assert_eq!(periods.term(InstrumentClass::Debt, 400), Term::Short);
        assert_eq!(periods.term(InstrumentClass::Crypto, 1096), Term::Long);
    }

    #[test]
    fn trade_kinds() {
        assert_eq!(TradeKind::parse("BUY"), Some(TradeKind::Buy));
        assert_eq!(TradeKind::parse(" s "), Some(TradeKind::Sell));
        assert_eq!(TradeKind::parse("transfer"), None);
    }
}
