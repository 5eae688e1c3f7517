//! Trade-executor feedback port.

use crate::domain::order::{ExecutionReport, Order};

/// Receives broker feedback synchronously on the caller's thread.
pub trait ExecutionListener {
    fn order_executed(&mut self, report: &ExecutionReport);
    fn order_updated(&mut self, order: &Order);
}
