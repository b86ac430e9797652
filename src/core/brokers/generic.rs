use super::{instrument_class, non_negative_price, normalize_instrument, Parsed};
use crate::core::gains::{Trade, TradeKind};
use crate::core::table::{amount_field, date_field, positive_field, required, RawTable, RowError, RowErrorKind};
use csv::StringRecord;

const DATE: &[&str] = &["date", "trade_date", "transaction_date", "order_date", "execution_date"];
const INSTRUMENT: &[&str] = &[
    "instrument", "symbol", "scrip", "scrip_name", "security", "security_name", "stock", "name",
];
const SIDE: &[&str] = &["type", "trade_type", "side", "transaction_type", "buy_sell", "action"];
const QUANTITY: &[&str] = &["quantity", "qty", "units", "shares"];
const PRICE: &[&str] = &["price", "rate", "trade_price", "avg_price", "nav"];
const CLASS: &[&str] = &["class", "instrument_class", "asset_class", "asset_type", "category"];

/// Column positions resolved once per table.
struct Columns {
    date: Option<usize>,
    instrument: Option<usize>,
    side: Option<usize>,
    quantity: Option<usize>,
    price: Option<usize>,
    class: Option<usize>,
}

impl Columns {
    fn resolve(table: &RawTable) -> Self {
        let find = |candidates: &[&'static str]| table.find_column(candidates).map(|(_, idx)| idx);
        let columns = Columns {
            date: find(DATE),
            instrument: find(INSTRUMENT),
            side: find(SIDE),
            quantity: find(QUANTITY),
            price: find(PRICE),
            class: find(CLASS),
        };
        log::debug!(
            "Generic mapping: date={:?} instrument={:?} side={:?} quantity={:?} price={:?}",
            columns.date,
            columns.instrument,
            columns.side,
            columns.quantity,
            columns.price
        );
        columns
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i)).map(str::to_string)
}

fn parse_row(columns: &Columns, record: &StringRecord) -> Result<Trade, RowErrorKind> {
    let instrument = normalize_instrument(required("instrument", &cell(record, columns.instrument))?);
    let side = cell(record, columns.side);
    let raw_kind = required("type", &side)?;
    let kind = TradeKind::parse(raw_kind).ok_or_else(|| RowErrorKind::UnknownTradeType {
        value: raw_kind.to_string(),
    })?;
    Ok(Trade {
        trade_date: date_field("date", &cell(record, columns.date))?,
        instrument_class: instrument_class(&instrument, &cell(record, columns.class)),
        instrument,
        kind,
        quantity: positive_field("quantity", &cell(record, columns.quantity))?,
        price: non_negative_price("price", amount_field("price", &cell(record, columns.price))?)?,
    })
}

/// Best-effort mapping for exports with no known signature, using the first
/// header found among common synonyms for each field.
pub(super) fn parse(table: &RawTable) -> Parsed {
    let columns = Columns::resolve(table);
    let mut trades = Vec::new();
    let mut errors = Vec::new();
    for (row, record) in table.rows() {
        match parse_row(&columns, record) {
            Ok(trade) => trades.push(trade),
            Err(kind) => errors.push(RowError { row, kind }),
        }
    }
    (trades, errors)
}
