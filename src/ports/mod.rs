//! Port traits at the edges of the domain.

pub mod config_port;
pub mod event_port;
pub mod execution_port;
pub mod report_port;
