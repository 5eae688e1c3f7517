//! Market data snapshots delivered to indicators.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::contract::Contract;

/// A single trade print.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub contract: Contract,
    pub time: DateTime<Utc>,
    pub price: Decimal,
    pub size: i64,
}

impl Trade {
    /// price * size
    pub fn value(&self) -> Decimal {
        self.price * Decimal::from(self.size)
    }
}

/// Top-of-book quote.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub contract: Contract,
    pub time: DateTime<Utc>,
    pub bid: Decimal,
    pub bid_size: i64,
    pub ask: Decimal,
    pub ask_size: i64,
}

impl Quote {
    /// (bid + ask) / 2
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// ask - bid
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}
