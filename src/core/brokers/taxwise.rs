use super::{instrument_class, normalize_instrument, BrokerRecord, ClosedPosition};
use crate::core::gains::Trade;
use crate::core::table::{amount_field, date_field, positive_field, required, RowErrorKind};
use serde::Deserialize;

// asset_name,asset_type,acquisition_date,sale_date,quantity,cost_of_acquisition,sale_value
// Bitcoin (BTC),Crypto,2021-02-01,2024-03-01,0.05,2100000,5200000
//
// Cost and sale columns may be per unit (`*_price`) or totals for the row.

#[derive(Debug, Deserialize)]
pub(super) struct Record {
    #[serde(alias = "scrip_name")]
    asset_name: Option<String>,
    asset_type: Option<String>,
    acquisition_date: Option<String>,
    sale_date: Option<String>,
    quantity: Option<String>,
    #[serde(alias = "acquisition_price")]
    cost_price: Option<String>,
    sale_price: Option<String>,
    cost_of_acquisition: Option<String>,
    sale_value: Option<String>,
}

impl BrokerRecord for Record {
    fn into_trades(self) -> Result<Vec<Trade>, RowErrorKind> {
        let instrument = normalize_instrument(required("asset_name", &self.asset_name)?);
        let quantity = positive_field("quantity", &self.quantity)?;
        let per_unit = |price_column: &str,
                        price: &Option<String>,
                        total_column: &str,
                        total: &Option<String>| {
            match price.as_deref().map(str::trim) {
                Some(p) if !p.is_empty() => amount_field(price_column, price),
                _ => amount_field(total_column, total).map(|t| t / quantity),
            }
        };
        ClosedPosition {
            class: instrument_class(&instrument, &self.asset_type),
            instrument,
            buy_date: date_field("acquisition_date", &self.acquisition_date)?,
            sell_date: date_field("sale_date", &self.sale_date)?,
            quantity,
            buy_price: per_unit(
                "cost_price",
                &self.cost_price,
                "cost_of_acquisition",
                &self.cost_of_acquisition,
            )?,
            sell_price: per_unit("sale_price", &self.sale_price, "sale_value", &self.sale_value)?,
        }
        .into_trades()
    }
}
