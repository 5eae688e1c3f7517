//! Per-contract position ledger with FIFO lot matching.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::contract::Contract;
use super::filled_block::FilledBlock;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    contract: Contract,
    size: i64,
    average_price: Option<Decimal>,
    open_blocks: VecDeque<FilledBlock>,
    realized_pnl: Decimal,
}

impl Position {
    pub fn new(contract: Contract) -> Self {
        Position {
            contract,
            size: 0,
            average_price: None,
            open_blocks: VecDeque::new(),
            realized_pnl: Decimal::ZERO,
        }
    }

    /// Apply one fill.
    ///
    /// A fill in the direction of the position (or onto a flat position) is
    /// appended as a new lot. An opposing fill consumes the oldest lots first;
    /// whatever is left once every lot is gone opens a new lot in the fill's
    /// own direction at the fill's price.
    pub fn add_filled_block(&mut self, block: FilledBlock) {
        if self.size == 0 || block.direction().sign() == self.size.signum() {
            self.open_blocks.push_back(block);
            self.recompute();
            return;
        }

        let mut remaining = block.size();
        while remaining > 0 {
            let Some(lot) = self.open_blocks.pop_front() else {
                break;
            };
            let consumed = lot.size().min(remaining);
            self.realized_pnl += (block.price() - lot.price())
                * Decimal::from(consumed * lot.direction().sign());

            if lot.size() > remaining {
                self.open_blocks.push_front(lot.resized(lot.size() - remaining));
            }
            remaining -= consumed;
        }

        if remaining > 0 {
            log::debug!(
                "{}: direction flip, opening {} {} @ {}",
                self.contract,
                block.direction(),
                remaining,
                block.price()
            );
            self.open_blocks.push_back(block.resized(remaining));
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.size = self.open_blocks.iter().map(FilledBlock::signed_size).sum();
        self.average_price = if self.size == 0 {
            self.open_blocks.clear();
            None
        } else {
            let total: Decimal = self.open_blocks.iter().map(FilledBlock::value).sum();
            Some(total / Decimal::from(self.size.abs()))
        };
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Signed open size: positive when long, negative when short.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Value-weighted average price of the open lots; `None` when flat.
    pub fn average_price(&self) -> Option<Decimal> {
        self.average_price
    }

    /// Open lots, oldest first.
    pub fn open_blocks(&self) -> &VecDeque<FilledBlock> {
        &self.open_blocks
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0
    }

    pub fn is_long(&self) -> bool {
        self.size > 0
    }

    pub fn is_short(&self) -> bool {
        self.size < 0
    }

    pub fn market_value(&self, price: Decimal) -> Decimal {
        Decimal::from(self.size.unsigned_abs()) * price
    }

    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        match self.average_price {
            Some(avg) => Decimal::from(self.size) * (price - avg),
            None => Decimal::ZERO,
        }
    }
}
