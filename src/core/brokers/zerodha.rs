use super::{instrument_class, non_negative_price, normalize_instrument, BrokerRecord, ClosedPosition};
use crate::core::gains::{Trade, TradeKind};
use crate::core::table::{amount_field, date_field, positive_field, required, RowErrorKind};
use serde::Deserialize;

// Tradebook:
// symbol,isin,trade_date,exchange,segment,series,trade_type,quantity,price,trade_id
// INFY,INE009A01021,2023-04-12,NSE,EQ,EQ,buy,10,1390.50,11223344
//
// Tax P&L (one realised position per row, `trade_date` is the sell date):
// symbol,isin,buy_date,trade_date,quantity,buy_price,sell_price
// INFY,INE009A01021,2022-03-01,2023-04-12,10,1500,1390.50

#[derive(Debug, Deserialize)]
pub(super) struct Record {
    #[serde(alias = "tradingsymbol")]
    symbol: Option<String>,
    isin: Option<String>,
    trade_date: Option<String>,
    segment: Option<String>,
    trade_type: Option<String>,
    #[serde(alias = "qty")]
    quantity: Option<String>,
    #[serde(alias = "sell_price")]
    price: Option<String>,
    buy_date: Option<String>,
    buy_price: Option<String>,
}

impl Record {
    fn has(value: &Option<String>) -> bool {
        value.as_deref().map_or(false, |v| !v.trim().is_empty())
    }
}

impl BrokerRecord for Record {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind> {
        let raw = if Self::has(&self.symbol) {
            required("symbol", &self.symbol)?
        } else {
            required("isin", &self.isin)?
        };
        let instrument = normalize_instrument(raw);
        let class = instrument_class(&instrument, &self.segment);
        let trade_date = date_field("trade_date", &self.trade_date)?;
        let quantity = positive_field("quantity", &self.quantity)?;
        let price = non_negative_price("price", amount_field("price", &self.price)?)?;

        if Self::has(&self.buy_date) {
            return ClosedPosition {
                instrument,
                class,
                buy_date: date_field("buy_date", &self.buy_date)?,
                sell_date: trade_date,
                quantity,
                buy_price: amount_field("buy_price", &self.buy_price)?,
                sell_price: price,
            }
            .into_trades();
        }

        let raw_kind = required("trade_type", &self.trade_type)?;
        let kind = TradeKind::parse(raw_kind).ok_or_else(|| RowErrorKind::UnknownTradeType {
            value: raw_kind.to_string(),
        })?;
        Ok(vec![Trade {
            trade_date,
            instrument,
            instrument_class: class,
            kind,
            quantity,
            price,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ingest, BrokerSource};
    use crate::core::gains::{InstrumentClass, TradeKind};
    use crate::core::table::{RawTable, RowErrorKind};
    use rust_decimal_macros::dec;

    #[test]
    fn reads_tradebook() {
        let data = "\
Symbol,ISIN,Trade Date,Exchange,Segment,Series,Trade Type,Quantity,Price,Trade ID
INFY,INE009A01021,2023-04-12,NSE,EQ,EQ,buy,10,1390.50,1
NSE:TCS-EQ,INE467B01029,15-05-2023,NSE,EQ,EQ,SELL,2,\"3,250.00\",2
WIPRO,INE075A01022,2023-06-01,NSE,EQ,EQ,transfer,1,400,3
";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();
        let ingestion = ingest(&table, None);

        assert_eq!(ingestion.source, BrokerSource::Zerodha);
        assert_eq!(ingestion.trades.len(), 2);
        assert_eq!(ingestion.trades[0].instrument, "INFY");
        assert_eq!(ingestion.trades[0].kind, TradeKind::Buy);
        assert_eq!(ingestion.trades[0].price, dec!(1390.50));
        assert_eq!(ingestion.trades[1].instrument, "TCS");
        assert_eq!(ingestion.trades[1].kind, TradeKind::Sell);
        assert_eq!(ingestion.trades[1].price, dec!(3250.00));
        assert_eq!(ingestion.row_errors.len(), 1);
        assert_eq!(ingestion.row_errors[0].row, 3);
        assert_eq!(
            ingestion.row_errors[0].kind,
            RowErrorKind::UnknownTradeType {
                value: "transfer".into()
            }
        );
    }

    #[test]
    fn reads_tax_pnl_rows_as_closed_positions() {
        let data = "\
symbol,isin,buy_date,trade_date,quantity,buy_price,sell_price,segment
INFY,INE009A01021,2022-03-01,2023-04-12,10,1500,1390.50,EQ
,INF879O01027,2021-01-01,2023-01-02,100,30,45,MF
";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();
        let ingestion = ingest(&table, None);

        assert!(ingestion.row_errors.is_empty());
        assert_eq!(ingestion.trades.len(), 4);
        assert_eq!(ingestion.trades[0].kind, TradeKind::Buy);
        assert_eq!(ingestion.trades[0].price, dec!(1500));
        assert_eq!(ingestion.trades[1].kind, TradeKind::Sell);
        assert_eq!(ingestion.trades[1].price, dec!(1390.50));
        assert_eq!(ingestion.trades[2].instrument, "INF879O01027");
        assert_eq!(ingestion.trades[2].instrument_class, InstrumentClass::MutualFund);
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let data = "symbol,isin,trade_date,trade_type,quantity,price\nINFY,X,2023-01-01,buy,0,10\n";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();
        let ingestion = ingest(&table, None);
        assert!(ingestion.trades.is_empty());
        assert!(matches!(
            ingestion.row_errors[0].kind,
            RowErrorKind::NotPositive { .. }
        ));
    }
}
