//! CSV event file adapter.
//!
//! One event per row, columns addressed by header name:
//! `time,kind,symbol,exchange,currency,direction,size,price,bid,bid_size,ask,ask_size,order_id,status`.
//! Columns a row kind does not use may be left empty.

use chrono::{DateTime, Utc};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::contract::Contract;
use crate::domain::error::TradecoreError;
use crate::domain::filled_block::FilledBlock;
use crate::domain::market::{Quote, Trade};
use crate::domain::order::{ExecutionReport, Order, OrderStatus};
use crate::domain::replay::StrategyEvent;
use crate::ports::event_port::EventSource;

pub struct CsvEventAdapter {
    path: PathBuf,
}

impl CsvEventAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl EventSource for CsvEventAdapter {
    fn events(&self) -> Result<Vec<StrategyEvent>, TradecoreError> {
        let content = fs::read_to_string(&self.path)?;
        parse_events(&content)
    }
}

struct Row<'a> {
    record: &'a StringRecord,
    columns: &'a HashMap<String, usize>,
    line: usize,
}

impl Row<'_> {
    fn error(&self, reason: impl Into<String>) -> TradecoreError {
        TradecoreError::EventParse {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn text(&self, column: &str) -> Result<&str, TradecoreError> {
        self.columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| self.error(format!("missing {column} column")))
    }

    fn parse<T: FromStr>(&self, column: &str) -> Result<T, TradecoreError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.text(column)?;
        raw.parse()
            .map_err(|e| self.error(format!("invalid {column} value '{raw}': {e}")))
    }

    fn time(&self) -> Result<DateTime<Utc>, TradecoreError> {
        let raw = self.text("time")?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| self.error(format!("invalid time '{raw}': {e}")))
    }

    fn contract(&self) -> Result<Contract, TradecoreError> {
        Ok(Contract::new(
            self.text("symbol")?,
            self.text("exchange")?,
            self.text("currency")?,
        ))
    }

    fn order(&self, status: OrderStatus) -> Result<Order, TradecoreError> {
        Ok(Order {
            id: self.text("order_id")?.to_string(),
            contract: self.contract()?,
            direction: self.parse("direction")?,
            status,
        })
    }
}

/// Parse an event file's content. Rows are returned in file order.
pub fn parse_events(content: &str) -> Result<Vec<StrategyEvent>, TradecoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns: HashMap<String, usize> = rdr
        .headers()
        .map_err(|e| TradecoreError::EventParse {
            line: 1,
            reason: format!("CSV header error: {e}"),
        })?
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect();

    let mut events = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| TradecoreError::EventParse {
            line: e.position().map(|p| p.line() as usize).unwrap_or(0),
            reason: format!("CSV parse error: {e}"),
        })?;
        let row = Row {
            record: &record,
            columns: &columns,
            line: record.position().map(|p| p.line() as usize).unwrap_or(0),
        };
        events.push(parse_row(&row)?);
    }

    log::debug!("parsed {} events", events.len());
    Ok(events)
}

fn parse_row(row: &Row<'_>) -> Result<StrategyEvent, TradecoreError> {
    let kind = row.text("kind")?.to_lowercase();
    match kind.as_str() {
        "trade" => Ok(StrategyEvent::Trade(Trade {
            contract: row.contract()?,
            time: row.time()?,
            price: row.parse::<Decimal>("price")?,
            size: row.parse("size")?,
        })),
        "quote" => Ok(StrategyEvent::Quote(Quote {
            contract: row.contract()?,
            time: row.time()?,
            bid: row.parse::<Decimal>("bid")?,
            bid_size: row.parse("bid_size")?,
            ask: row.parse::<Decimal>("ask")?,
            ask_size: row.parse("ask_size")?,
        })),
        "fill" => {
            let status = match row.text("status") {
                Ok(_) => row.parse("status")?,
                Err(_) => OrderStatus::Filled,
            };
            let order = row.order(status)?;
            let block = FilledBlock::new(
                order.direction,
                row.parse("size")?,
                row.parse::<Decimal>("price")?,
                row.time()?,
            )
            .map_err(|e| row.error(e.to_string()))?;
            Ok(StrategyEvent::Executed(ExecutionReport { order, block }))
        }
        "update" => Ok(StrategyEvent::Updated(row.order(row.parse("status")?)?)),
        other => Err(row.error(format!("unknown event kind '{other}'"))),
    }
}
