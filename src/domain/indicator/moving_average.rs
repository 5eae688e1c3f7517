//! Simple moving average of period closing prices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::price::LastPrice;
use super::{Indicator, IndicatorCore, IndicatorState};
use crate::domain::error::TradecoreError;
use crate::domain::properties::Properties;

/// Mean of the last `periods` period-end values of [`LastPrice`]. Periods
/// that end without any trade yet are skipped. Warmup: unset until
/// `periods` closes have been seen.
pub struct MovingAverage {
    core: IndicatorCore<Decimal>,
    last: Rc<RefCell<LastPrice>>,
    periods: usize,
    closes: VecDeque<Decimal>,
}

impl MovingAverage {
    pub fn new(
        last: Rc<RefCell<LastPrice>>,
        periods: usize,
        collect_periodic: bool,
    ) -> Result<Self, TradecoreError> {
        if periods == 0 {
            return Err(TradecoreError::invalid_argument(
                "moving average needs at least one period",
            ));
        }
        let core = IndicatorCore::new(
            format!("SMA({periods})"),
            "mean of the last period closes",
        )
        .with_parameters(Properties::new().with("periods", periods))
        .collecting_periodic(collect_periodic)
        .depends_on(last.clone());

        Ok(MovingAverage {
            core,
            last,
            periods,
            closes: VecDeque::new(),
        })
    }

    pub fn core(&self) -> &IndicatorCore<Decimal> {
        &self.core
    }
}

impl Indicator for MovingAverage {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }

    fn end_of_period(&mut self, _time: DateTime<Utc>) {
        let Ok(close) = self.last.borrow().core().value() else {
            return;
        };
        if self.closes.len() == self.periods {
            self.closes.pop_front();
        }
        self.closes.push_back(close);

        if self.closes.len() == self.periods {
            let sum: Decimal = self.closes.iter().sum();
            self.core
                .set_value((sum / Decimal::from(self.periods)).normalize());
        }
    }
}
