//! Plain-text report adapter implementing ReportPort.

use std::io::Write;

use rust_decimal::Decimal;

use crate::domain::error::TradecoreError;
use crate::domain::replay::{IndicatorLine, PositionLine, ReplaySummary};
use crate::ports::report_port::ReportPort;

const PRICE_DP: u32 = 4;

#[derive(Debug, Default)]
pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        TextReportAdapter
    }
}

fn price(value: Decimal) -> String {
    value.round_dp(PRICE_DP).normalize().to_string()
}

fn write_positions(out: &mut dyn Write, positions: &[PositionLine]) -> std::io::Result<()> {
    writeln!(out, "Positions")?;
    if positions.is_empty() {
        return writeln!(out, "  (none)");
    }
    writeln!(
        out,
        "  {:<24} {:>10} {:>14} {:>5} {:>14}",
        "contract", "size", "avg price", "lots", "realized"
    )?;
    for p in positions {
        writeln!(
            out,
            "  {:<24} {:>10} {:>14} {:>5} {:>14}",
            p.contract.to_string(),
            p.size,
            p.average_price.map_or_else(|| "-".to_string(), price),
            p.open_lots,
            price(p.realized_pnl),
        )?;
    }
    Ok(())
}

fn write_indicators(out: &mut dyn Write, indicators: &[IndicatorLine]) -> std::io::Result<()> {
    writeln!(out, "Indicators")?;
    if indicators.is_empty() {
        return writeln!(out, "  (none)");
    }
    for line in indicators {
        let label = if line.parameters.is_empty() {
            line.title.clone()
        } else {
            format!("{} [{}]", line.title, line.parameters)
        };
        let value = line.value.as_deref().unwrap_or("unset");
        if line.periods_recorded > 0 {
            writeln!(
                out,
                "  {label:<32} {value:>14}  ({} periods)",
                line.periods_recorded
            )?;
        } else {
            writeln!(out, "  {label:<32} {value:>14}")?;
        }
    }
    Ok(())
}

impl ReportPort for TextReportAdapter {
    fn write(&self, summary: &ReplaySummary, out: &mut dyn Write) -> Result<(), TradecoreError> {
        writeln!(out, "Replayed {} events", summary.events)?;
        writeln!(out)?;
        write_positions(out, &summary.positions)?;
        writeln!(out)?;
        write_indicators(out, &summary.indicators)?;
        Ok(())
    }
}
