use super::{instrument_class, non_negative_price, normalize_instrument, BrokerRecord, ClosedPosition};
use crate::core::gains::{Trade, TradeKind};
use crate::core::table::{amount_field, date_field, positive_field, required, RowErrorKind};
use serde::Deserialize;

// Capital gains statement (mutual funds and stocks), sell side in `transaction_date`:
// security_name,isin,buy_date,transaction_date,units,buy_price,sell_price,asset_type
// Parag Parikh Flexi Cap Fund - Direct Growth,INF879O01027,2021-01-01,2023-01-02,100.5,30.12,55.40,Mutual Fund
//
// Order history rows have no `buy_date` and carry `transaction_type` and `price` instead.

#[derive(Debug, Deserialize)]
pub(super) struct Record {
    security_name: Option<String>,
    transaction_date: Option<String>,
    buy_date: Option<String>,
    #[serde(alias = "quantity")]
    units: Option<String>,
    #[serde(alias = "purchase_price")]
    buy_price: Option<String>,
    #[serde(alias = "redemption_price")]
    sell_price: Option<String>,
    #[serde(alias = "nav")]
    price: Option<String>,
    #[serde(alias = "type")]
    transaction_type: Option<String>,
    #[serde(alias = "category")]
    asset_type: Option<String>,
}

impl BrokerRecord for Record {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind> {
        let instrument = normalize_instrument(required("security_name", &self.security_name)?);
        let class = instrument_class(&instrument, &self.asset_type);
        let transaction_date = date_field("transaction_date", &self.transaction_date)?;
        let units = positive_field("units", &self.units)?;

        if self.buy_date.as_deref().map_or(false, |d| !d.trim().is_empty()) {
            return ClosedPosition {
                instrument,
                class,
                buy_date: date_field("buy_date", &self.buy_date)?,
                sell_date: transaction_date,
                quantity: units,
                buy_price: amount_field("buy_price", &self.buy_price)?,
                sell_price: amount_field("sell_price", &self.sell_price)?,
            }
            .into_trades();
        }

        let raw_kind = required("transaction_type", &self.transaction_type)?;
        let kind = TradeKind::parse(raw_kind).ok_or_else(|| RowErrorKind::UnknownTradeType {
            value: raw_kind.to_string(),
        })?;
        let price = non_negative_price("price", amount_field("price", &self.price)?)?;
        Ok(vec![Trade {
            trade_date: transaction_date,
            instrument,
            instrument_class: class,
            kind,
            quantity: units,
            price,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ingest, BrokerSource};
    use crate::core::gains::{InstrumentClass, TradeKind};
    use crate::core::table::{RawTable, RowErrorKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn reads_capital_gains_statement() {
        let data = "\
Security Name,ISIN,Buy Date,Transaction Date,Units,Buy Price,Sell Price,Asset Type
Parag Parikh Flexi Cap Fund - Direct Growth,INF879O01027,01-01-2021,02-01-2023,100.5,30.12,55.40,Mutual Fund
HDFC Bank,INE040A01034,2023-02-01,2023-01-01,5,1600,1650,Stocks
";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();
        let ingestion = ingest(&table, None);

        assert_eq!(ingestion.source, BrokerSource::Groww);
        assert_eq!(ingestion.trades.len(), 2);
        let buy = &ingestion.trades[0];
        assert_eq!(buy.kind, TradeKind::Buy);
        assert_eq!(buy.trade_date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(buy.quantity, dec!(100.5));
        assert_eq!(buy.instrument_class, InstrumentClass::MutualFund);
        assert_eq!(ingestion.trades[1].price, dec!(55.40));

        assert_eq!(ingestion.row_errors.len(), 1);
        assert!(matches!(
            ingestion.row_errors[0].kind,
            RowErrorKind::SellBeforeBuy { .. }
        ));
    }

    #[test]
    fn reads_order_history() {
        let data = "\
security_name,transaction_date,units,nav,type
Axis Bluechip Fund,2023-03-01,10,45.5,PURCHASE
Axis Bluechip Fund,2024-04-01,10,52,REDEEM
";
        let table = RawTable::from_csv(data.as_bytes()).unwrap();
        let ingestion = ingest(&table, None);
        assert!(ingestion.row_errors.is_empty());
        assert_eq!(ingestion.trades[0].kind, TradeKind::Buy);
        assert_eq!(ingestion.trades[1].kind, TradeKind::Sell);
        assert_eq!(ingestion.trades[1].price, dec!(52));
    }
}
