//! Measures: indicators that also react to order feedback.
//!
//! A [`MeasureList`] orders and feeds market data exactly like an
//! [`IndicatorList`]; order feedback goes only to the members registered as
//! measures, in the same order.

pub mod execution_stats;
pub mod pnl;

use std::cell::RefCell;
use std::rc::Rc;

use crate::domain::error::TradecoreError;
use crate::domain::indicator::list::Member;
use crate::domain::indicator::{Indicator, IndicatorHandle, IndicatorList};
use crate::domain::market::{Quote, Trade};
use crate::domain::order::{ExecutionReport, Order};
use crate::domain::period::PeriodSplitter;
use crate::ports::execution_port::ExecutionListener;

pub type MeasureHandle = Rc<RefCell<dyn Measure>>;

pub trait Measure: Indicator {
    fn order_executed(&mut self, _report: &ExecutionReport) {}
    fn order_updated(&mut self, _order: &Order) {}
}

#[derive(Default)]
pub struct MeasureList {
    indicators: IndicatorList,
}

impl MeasureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_splitter(splitter: Box<dyn PeriodSplitter>) -> Self {
        MeasureList {
            indicators: IndicatorList::with_splitter(splitter),
        }
    }

    /// Register a plain indicator. It receives market data only.
    pub fn add(&mut self, indicator: IndicatorHandle) -> Result<(), TradecoreError> {
        self.indicators.add(indicator)
    }

    /// Register a measure. It receives market data and order feedback.
    pub fn add_measure<M: Measure + 'static>(
        &mut self,
        measure: Rc<RefCell<M>>,
    ) -> Result<(), TradecoreError> {
        let indicator: IndicatorHandle = measure.clone();
        let measure: MeasureHandle = measure;
        self.indicators.insert(Member {
            indicator,
            measure: Some(measure),
        })
    }

    pub fn trade_received(&mut self, trade: &Trade) {
        self.indicators.trade_received(trade);
    }

    pub fn quote_received(&mut self, quote: &Quote) {
        self.indicators.quote_received(quote);
    }

    pub fn order_executed(&mut self, report: &ExecutionReport) {
        for measure in self.indicators.measures() {
            measure.borrow_mut().order_executed(report);
        }
    }

    pub fn order_updated(&mut self, order: &Order) {
        for measure in self.indicators.measures() {
            measure.borrow_mut().order_updated(order);
        }
    }

    /// All members, measures included, in dispatch order.
    pub fn indicators(&self) -> &IndicatorList {
        &self.indicators
    }

    pub fn measure_count(&self) -> usize {
        self.indicators.measures().count()
    }
}

impl ExecutionListener for MeasureList {
    fn order_executed(&mut self, report: &ExecutionReport) {
        MeasureList::order_executed(self, report);
    }

    fn order_updated(&mut self, order: &Order) {
        MeasureList::order_updated(self, order);
    }
}
