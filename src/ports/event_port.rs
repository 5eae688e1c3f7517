//! Event input port trait.

use crate::domain::error::TradecoreError;
use crate::domain::replay::StrategyEvent;

/// A source of strategy events in delivery order.
pub trait EventSource {
    fn events(&self) -> Result<Vec<StrategyEvent>, TradecoreError>;
}
