//! Price snapshots taken straight from market data.

use rust_decimal::Decimal;

use super::{Indicator, IndicatorCore, IndicatorState};
use crate::domain::market::{Quote, Trade};

/// Price of the most recent trade.
pub struct LastPrice {
    core: IndicatorCore<Decimal>,
}

impl LastPrice {
    pub fn new(collect_periodic: bool) -> Self {
        LastPrice {
            core: IndicatorCore::new("Last price", "price of the most recent trade")
                .collecting_periodic(collect_periodic),
        }
    }

    pub fn core(&self) -> &IndicatorCore<Decimal> {
        &self.core
    }
}

impl Indicator for LastPrice {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }

    fn trade_received(&mut self, trade: &Trade) {
        self.core.set_value(trade.price);
    }
}

/// Midpoint of the most recent quote. One-sided or crossed quotes leave the
/// previous value in place.
pub struct MidPrice {
    core: IndicatorCore<Decimal>,
}

impl MidPrice {
    pub fn new(collect_periodic: bool) -> Self {
        MidPrice {
            core: IndicatorCore::new("Mid price", "midpoint of the most recent quote")
                .collecting_periodic(collect_periodic),
        }
    }

    pub fn core(&self) -> &IndicatorCore<Decimal> {
        &self.core
    }
}

impl Indicator for MidPrice {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }

    fn quote_received(&mut self, quote: &Quote) {
        if quote.bid_size > 0 && quote.ask_size > 0 && quote.bid <= quote.ask {
            self.core.set_value(quote.mid());
        }
    }
}
