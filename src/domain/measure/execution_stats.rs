//! Counters over the order feedback stream.

use super::Measure;
use crate::domain::indicator::{Indicator, IndicatorCore, IndicatorState};
use crate::domain::order::{ExecutionReport, Order, OrderStatus};

/// Number of executions received.
pub struct FillCount {
    core: IndicatorCore<u64>,
}

impl FillCount {
    pub fn new(collect_periodic: bool) -> Self {
        let mut core = IndicatorCore::new("Fill count", "executions received")
            .collecting_periodic(collect_periodic);
        core.set_value(0);
        FillCount { core }
    }

    pub fn core(&self) -> &IndicatorCore<u64> {
        &self.core
    }
}

impl Indicator for FillCount {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }
}

impl Measure for FillCount {
    fn order_executed(&mut self, _report: &ExecutionReport) {
        let count = self.core.value().unwrap_or(0);
        self.core.set_value(count + 1);
    }
}

/// Total filled size, both directions.
pub struct TradedVolume {
    core: IndicatorCore<i64>,
}

impl TradedVolume {
    pub fn new(collect_periodic: bool) -> Self {
        let mut core = IndicatorCore::new("Traded volume", "total filled size")
            .collecting_periodic(collect_periodic);
        core.set_value(0);
        TradedVolume { core }
    }

    pub fn core(&self) -> &IndicatorCore<i64> {
        &self.core
    }
}

impl Indicator for TradedVolume {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }
}

impl Measure for TradedVolume {
    fn order_executed(&mut self, report: &ExecutionReport) {
        let volume = self.core.value().unwrap_or(0);
        self.core.set_value(volume + report.block.size());
    }
}

/// Orders that ended cancelled or rejected.
pub struct RejectedOrders {
    core: IndicatorCore<u64>,
}

impl RejectedOrders {
    pub fn new(collect_periodic: bool) -> Self {
        let mut core = IndicatorCore::new("Rejected orders", "orders cancelled or rejected")
            .collecting_periodic(collect_periodic);
        core.set_value(0);
        RejectedOrders { core }
    }

    pub fn core(&self) -> &IndicatorCore<u64> {
        &self.core
    }
}

impl Indicator for RejectedOrders {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }
}

impl Measure for RejectedOrders {
    fn order_updated(&mut self, order: &Order) {
        if matches!(order.status, OrderStatus::Cancelled | OrderStatus::Rejected) {
            let count = self.core.value().unwrap_or(0);
            self.core.set_value(count + 1);
        }
    }
}
