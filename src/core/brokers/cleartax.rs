use super::{instrument_class, normalize_instrument, BrokerRecord, ClosedPosition};
use crate::core::gains::Trade;
use crate::core::table::{amount_field, date_field, positive_field, required, RowErrorKind};
use serde::Deserialize;

// name,isin,category,buy_date,sell_date,quantity,buy_price,sell_price,gain
// Infosys Ltd,INE009A01021,Equity,2022-05-10,2024-05-20,15,1420,1480,900

#[derive(Debug, Deserialize)]
pub(super) struct Record {
    #[serde(alias = "stock_name")]
    name: Option<String>,
    #[serde(alias = "asset_class")]
    category: Option<String>,
    buy_date: Option<String>,
    sell_date: Option<String>,
    #[serde(alias = "units")]
    quantity: Option<String>,
    #[serde(alias = "purchase_price")]
    buy_price: Option<String>,
    #[serde(alias = "sale_price")]
    sell_price: Option<String>,
}

impl BrokerRecord for Record {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind> {
        let instrument = normalize_instrument(required("name", &self.name)?);
        ClosedPosition {
            class: instrument_class(&instrument, &self.category),
            instrument,
            buy_date: date_field("buy_date", &self.buy_date)?,
            sell_date: date_field("sell_date", &self.sell_date)?,
            quantity: positive_field("quantity", &self.quantity)?,
            buy_price: amount_field("buy_price", &self.buy_price)?,
            sell_price: amount_field("sell_price", &self.sell_price)?,
        }
        .into_trades()
    }
}
