//! Report generation port trait.

use std::io::Write;

use crate::domain::error::TradecoreError;
use crate::domain::replay::ReplaySummary;

/// Port for writing replay reports.
pub trait ReportPort {
    fn write(&self, summary: &ReplaySummary, out: &mut dyn Write) -> Result<(), TradecoreError>;
}
