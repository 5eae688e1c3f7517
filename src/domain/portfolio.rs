//! Account-wide position ledger keyed by contract.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::contract::Contract;
use super::filled_block::FilledBlock;
use super::order::{ExecutionReport, Order};
use super::position::Position;
use crate::ports::execution_port::ExecutionListener;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    positions: HashMap<Contract, Position>,
}

impl Portfolio {
    pub fn new() -> Self {
        Portfolio {
            positions: HashMap::new(),
        }
    }

    /// Book a fill against the contract's position, creating the position on
    /// the first fill seen for that contract.
    pub fn order_executed(&mut self, contract: &Contract, block: FilledBlock) {
        log::debug!(
            "PORTFOLIO: {} {} {} @ {}",
            contract,
            block.direction(),
            block.size(),
            block.price()
        );
        self.positions
            .entry(contract.clone())
            .or_insert_with(|| Position::new(contract.clone()))
            .add_filled_block(block);
    }

    pub fn position(&self, contract: &Contract) -> Option<&Position> {
        self.positions.get(contract)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn total_realized_pnl(&self) -> Decimal {
        self.positions.values().map(Position::realized_pnl).sum()
    }
}

impl ExecutionListener for Portfolio {
    fn order_executed(&mut self, report: &ExecutionReport) {
        Portfolio::order_executed(self, report.contract(), report.block.clone());
    }

    /// Status-only updates carry no accounting information.
    fn order_updated(&mut self, _order: &Order) {}
}
