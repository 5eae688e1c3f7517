//! Realized profit and loss across every contract the strategy trades.

use rust_decimal::Decimal;

use super::Measure;
use crate::domain::indicator::{Indicator, IndicatorCore, IndicatorState};
use crate::domain::order::ExecutionReport;
use crate::domain::portfolio::Portfolio;

/// Books every execution into a private ledger and exposes the realized PnL
/// summed over all contracts. Unset until the first execution.
///
/// The ledger duplicates the booking a [`Replay`](crate::domain::replay::Replay)
/// does into its own portfolio, so the measure gives the same figure in any
/// [`MeasureList`](super::MeasureList), with or without a replay around it.
/// It only agrees with the replay's portfolio when both see the same fills.
pub struct RealizedPnl {
    core: IndicatorCore<Decimal>,
    ledger: Portfolio,
}

impl RealizedPnl {
    pub fn new(collect_periodic: bool) -> Self {
        RealizedPnl {
            core: IndicatorCore::new("Realized PnL", "realized profit and loss, FIFO matched")
                .collecting_periodic(collect_periodic),
            ledger: Portfolio::new(),
        }
    }

    pub fn core(&self) -> &IndicatorCore<Decimal> {
        &self.core
    }
}

impl Indicator for RealizedPnl {
    fn state(&self) -> &dyn IndicatorState {
        &self.core
    }

    fn state_mut(&mut self) -> &mut dyn IndicatorState {
        &mut self.core
    }
}

impl Measure for RealizedPnl {
    fn order_executed(&mut self, report: &ExecutionReport) {
        self.ledger
            .order_executed(report.contract(), report.block.clone());
        self.core.set_value(self.ledger.total_realized_pnl());
    }
}
