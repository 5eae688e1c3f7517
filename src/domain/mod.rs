//! Core domain types and logic.

pub mod contract;
pub mod market;
pub mod filled_block;
pub mod order;
pub mod position;
pub mod portfolio;
pub mod period;
pub mod properties;
pub mod indicator;
pub mod measure;
pub mod replay;
pub mod config_validation;
pub mod error;
