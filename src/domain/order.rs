//! Orders and execution reports arriving from the trade executor.

use std::fmt;

use super::contract::Contract;
use super::error::TradecoreError;
use super::filled_block::{Direction, FilledBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
}

impl OrderStatus {
    /// No further executions can arrive for the order.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::New => "new",
            OrderStatus::PartiallyFilled => "partially_filled",
            OrderStatus::Filled => "filled",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = TradecoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(OrderStatus::New),
            "partially_filled" | "partial" => Ok(OrderStatus::PartiallyFilled),
            "filled" => Ok(OrderStatus::Filled),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "rejected" => Ok(OrderStatus::Rejected),
            other => Err(TradecoreError::invalid_argument(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub contract: Contract,
    pub direction: Direction,
    pub status: OrderStatus,
}

/// A fill of (part of) an order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub order: Order,
    pub block: FilledBlock,
}

impl ExecutionReport {
    pub fn contract(&self) -> &Contract {
        &self.order.contract
    }
}
