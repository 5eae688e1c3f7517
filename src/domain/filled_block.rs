//! Fill records held as lots in a position ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

use super::error::TradecoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Long => 1,
            Direction::Short => -1,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = TradecoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LONG" | "BUY" => Ok(Direction::Long),
            "SHORT" | "SELL" => Ok(Direction::Short),
            other => Err(TradecoreError::invalid_argument(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

/// One atomic execution. The size is always strictly positive; the sign
/// lives in `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledBlock {
    direction: Direction,
    size: i64,
    price: Decimal,
    time: DateTime<Utc>,
}

impl FilledBlock {
    pub fn new(
        direction: Direction,
        size: i64,
        price: Decimal,
        time: DateTime<Utc>,
    ) -> Result<Self, TradecoreError> {
        if size <= 0 {
            return Err(TradecoreError::invalid_argument(format!(
                "filled block size must be positive, got {size}"
            )));
        }
        Ok(FilledBlock {
            direction,
            size,
            price,
            time,
        })
    }

    /// Same price, direction and time with a reduced size. Callers guarantee
    /// `size > 0`.
    pub(crate) fn resized(&self, size: i64) -> FilledBlock {
        debug_assert!(size > 0);
        FilledBlock { size, ..self.clone() }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Size with the direction's sign applied.
    pub fn signed_size(&self) -> i64 {
        self.size * self.direction.sign()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// price * size
    pub fn value(&self) -> Decimal {
        self.price * Decimal::from(self.size)
    }
}
