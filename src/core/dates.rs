use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%b-%y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a date as written by Indian brokers, banks and bureaus.
///
/// Day-first forms (`15-01-2024`, `15/01/2024`) are read day-first; there is
/// no month-first interpretation. Datetimes keep only the date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Elapsed years between two dates, using a 365.25 day year.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> Decimal {
    Decimal::from((to - from).num_days()) / dec!(365.25)
}

/// A date supplied by a caller that may not parse.
///
/// Unparseable input is kept verbatim so it can be reported back as a
/// warning; calculators treat it as "no information".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LenientDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl LenientDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            LenientDate::Parsed(date) => Some(*date),
            LenientDate::Unparsed(_) => None,
        }
    }

    pub fn raw(&self) -> String {
        self.to_string()
    }
}

impl From<NaiveDate> for LenientDate {
    fn from(date: NaiveDate) -> Self {
        LenientDate::Parsed(date)
    }
}

impl From<&str> for LenientDate {
    fn from(raw: &str) -> Self {
        match parse_date(raw) {
            Some(date) => LenientDate::Parsed(date),
            None => LenientDate::Unparsed(raw.to_string()),
        }
    }
}

impl fmt::Display for LenientDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LenientDate::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            LenientDate::Unparsed(raw) => write!(f, "{raw}"),
        }
    }
}

impl Serialize for LenientDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LenientDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LenientDate::from(raw.as_str()))
    }
}
