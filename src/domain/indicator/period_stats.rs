//! Per-period trade statistics.
//!
//! These indicators reset at every period start. `PeriodChange` reads
//! `LastPrice` and `PeriodOpen`, so it relies on the list delivering each
//! trade to those two first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::rc::Rc;

use super::price::LastPrice;
use super::{Indicator, IndicatorCore, IndicatorState};
use crate::domain::market::Trade;

/// Price of the first trade of the current period.
pub struct PeriodOpen {
    core: IndicatorCore<Decimal>,
}

impl PeriodOpen {
    pub fn new(collect_periodic: bool) -> Self {
        PeriodOpen {
            core: IndicatorCore::new("Period open", "first trade price of the period")
                .collecting_periodic(collect_periodic),
        }
    }

    pub fn core(&self) -> &IndicatorCore<Decimal> {
        &self.core
    }
}

impl Indicator for PeriodOpen {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }

    fn trade_received(&mut self, trade: &Trade) {
        if !self.core.is_set() {
            self.core.set_value(trade.price);
        }
    }

    fn beginning_of_period(&mut self, _time: DateTime<Utc>) {
        self.core.unset_value();
    }
}

/// Total traded size within the current period.
pub struct PeriodVolume {
    core: IndicatorCore<i64>,
}

impl PeriodVolume {
    pub fn new(collect_periodic: bool) -> Self {
        PeriodVolume {
            core: IndicatorCore::new("Period volume", "traded size within the period")
                .collecting_periodic(collect_periodic),
        }
    }

    pub fn core(&self) -> &IndicatorCore<i64> {
        &self.core
    }
}

impl Indicator for PeriodVolume {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }

    fn trade_received(&mut self, trade: &Trade) {
        let so_far = self.core.value().unwrap_or(0);
        self.core.set_value(so_far + trade.size);
    }

    fn beginning_of_period(&mut self, _time: DateTime<Utc>) {
        self.core.set_value(0);
    }
}

/// Last price minus the period open. Unset while either input is unset.
pub struct PeriodChange {
    core: IndicatorCore<Decimal>,
    last: Rc<RefCell<LastPrice>>,
    open: Rc<RefCell<PeriodOpen>>,
}

impl PeriodChange {
    pub fn new(
        last: Rc<RefCell<LastPrice>>,
        open: Rc<RefCell<PeriodOpen>>,
        collect_periodic: bool,
    ) -> Self {
        let core = IndicatorCore::new("Period change", "last price minus period open")
            .collecting_periodic(collect_periodic)
            .depends_on(last.clone())
            .depends_on(open.clone());
        PeriodChange { core, last, open }
    }

    pub fn core(&self) -> &IndicatorCore<Decimal> {
        &self.core
    }

    fn refresh(&mut self) {
        let last = self.last.borrow().core().value();
        let open = self.open.borrow().core().value();
        match (last, open) {
            (Ok(last), Ok(open)) => self.core.set_value(last - open),
            _ => self.core.unset_value(),
        }
    }
}

impl Indicator for PeriodChange {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }

    fn trade_received(&mut self, _trade: &Trade) {
        self.refresh();
    }

    fn beginning_of_period(&mut self, _time: DateTime<Utc>) {
        self.core.unset_value();
    }
}
