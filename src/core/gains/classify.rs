use super::{
    GainRecord, HoldingPeriods, InstrumentClass, InvalidTradeError, Trade, TradeKind,
    UnmatchedSellError,
};
use crate::core::money::Money;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// Unconsumed quantity of one buy
#[derive(Debug, Clone)]
struct Lot {
    date: NaiveDate,
    quantity: Decimal,
    price: Money,
    class: InstrumentClass,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub records: Vec<GainRecord>,
    pub unmatched: Vec<UnmatchedSellError>,
    /// Trades with a non-positive quantity or a negative price
    pub invalid: Vec<InvalidTradeError>,
}

fn validate(trade: &Trade) -> Result<(), InvalidTradeError> {
    let reason = if trade.quantity <= Decimal::ZERO {
        "quantity must be positive"
    } else if trade.price.is_sign_negative() && !trade.price.is_zero() {
        "price must not be negative"
    } else {
        return Ok(());
    };
    Err(InvalidTradeError {
        instrument: trade.instrument.clone(),
        trade_date: trade.trade_date,
        kind: trade.kind,
        quantity: trade.quantity,
        reason: reason.to_string(),
    })
}

/// Match sells against earlier buys of the same instrument, oldest lot first.
///
/// Trades are processed in date order with buys ahead of sells on the same
/// day. Each lot a sell draws from yields its own [`GainRecord`]; any sold
/// quantity left without a lot is reported as an [`UnmatchedSellError`].
/// Trades with a non-positive quantity or a negative price take no part in
/// matching and are reported in `invalid`.
pub fn classify(trades: &[Trade], periods: &HoldingPeriods) -> Classification {
    let mut result = Classification::default();
    let mut ordered: Vec<&Trade> = Vec::with_capacity(trades.len());
    for trade in trades {
        match validate(trade) {
            Ok(()) => ordered.push(trade),
            Err(error) => {
                log::warn!("{}", error);
                result.invalid.push(error);
            }
        }
    }
    ordered.sort_by_key(|t| (t.trade_date, t.kind == TradeKind::Sell));

    let mut lots: HashMap<String, VecDeque<Lot>> = HashMap::new();

    for trade in ordered {
        let key = trade.instrument.to_uppercase();
        match trade.kind {
            TradeKind::Buy => {
                lots.entry(key).or_default().push_back(Lot {
                    date: trade.trade_date,
                    quantity: trade.quantity,
                    price: trade.price,
                    class: trade.instrument_class,
                });
            }
            TradeKind::Sell => {
                let queue = lots.entry(key).or_default();
                let mut remaining = trade.quantity;

                while remaining > Decimal::ZERO {
                    let Some(lot) = queue.front_mut() else {
                        break;
                    };
                    let quantity = remaining.min(lot.quantity);
                    let holding_period_days = (trade.trade_date - lot.date).num_days();
                    let term = periods.term(lot.class, holding_period_days);
                    log::debug!(
                        "{} sell {}: matched {} from lot of {} ({} days, {})",
                        trade.instrument,
                        trade.trade_date,
                        quantity,
                        lot.date,
                        holding_period_days,
                        term
                    );
                    result.records.push(GainRecord {
                        trade_date: trade.trade_date,
                        buy_date: lot.date,
                        instrument: trade.instrument.clone(),
                        instrument_class: lot.class,
                        quantity,
                        buy_price: lot.price,
                        sell_price: trade.price,
                        gain_loss: (trade.price - lot.price) * quantity,
                        holding_period_days,
                        term,
                    });

                    lot.quantity -= quantity;
                    remaining -= quantity;
                    if lot.quantity.is_zero() {
                        queue.pop_front();
                    }
                }

                if remaining > Decimal::ZERO {
                    let error = UnmatchedSellError {
                        instrument: trade.instrument.clone(),
                        trade_date: trade.trade_date,
                        quantity: remaining,
                    };
                    log::warn!("{}", error);
                    result.unmatched.push(error);
                }
            }
        }
    }

    log::info!(
        "Classified {} gain records, {} unmatched sells, {} invalid trades",
        result.records.len(),
        result.unmatched.len(),
        result.invalid.len()
    );
    result
}
