use super::{instrument_class, normalize_instrument, BrokerRecord, ClosedPosition};
use crate::core::gains::Trade;
use crate::core::table::{amount_field, date_field, positive_field, required, RowErrorKind};
use serde::Deserialize;

// symbol,scrip_type,buy_date,sell_date,qty,buy_rate,sell_rate,profit_loss
// NSE:SBIN-EQ,EQ,10-Apr-2023,12-Jun-2024,20,560.25,812.10,5037.00

#[derive(Debug, Deserialize)]
pub(super) struct Record {
    symbol: Option<String>,
    #[serde(alias = "segment")]
    scrip_type: Option<String>,
    buy_date: Option<String>,
    sell_date: Option<String>,
    #[serde(alias = "quantity")]
    qty: Option<String>,
    #[serde(alias = "buy_price")]
    buy_rate: Option<String>,
    #[serde(alias = "sell_price")]
    sell_rate: Option<String>,
}

impl BrokerRecord for Record {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind> {
        let instrument = normalize_instrument(required("symbol", &self.symbol)?);
        ClosedPosition {
            class: instrument_class(&instrument, &self.scrip_type),
            instrument,
            buy_date: date_field("buy_date", &self.buy_date)?,
            sell_date: date_field("sell_date", &self.sell_date)?,
            quantity: positive_field("qty", &self.qty)?,
            buy_price: amount_field("buy_rate", &self.buy_rate)?,
            sell_price: amount_field("sell_rate", &self.sell_rate)?,
        }
        .into_trades()
    }
}
