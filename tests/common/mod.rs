#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::io::Write;
use tradecore::domain::contract::Contract;
use tradecore::domain::filled_block::{Direction, FilledBlock};
use tradecore::domain::market::{Quote, Trade};
use tradecore::domain::order::{ExecutionReport, Order, OrderStatus};
use tradecore::domain::replay::StrategyEvent;

pub const EVENT_HEADER: &str =
    "time,kind,symbol,exchange,currency,direction,size,price,bid,bid_size,ask,ask_size,order_id,status";

pub fn bhp() -> Contract {
    Contract::new("BHP", "ASX", "AUD")
}

pub fn cba() -> Contract {
    Contract::new("CBA", "ASX", "AUD")
}

/// Seconds after 2024-01-15 00:00:00 UTC.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn block(direction: Direction, size: i64, price: &str, secs: i64) -> FilledBlock {
    FilledBlock::new(direction, size, dec(price), at(secs)).unwrap()
}

pub fn trade(contract: &Contract, secs: i64, price: &str, size: i64) -> StrategyEvent {
    StrategyEvent::Trade(Trade {
        contract: contract.clone(),
        time: at(secs),
        price: dec(price),
        size,
    })
}

pub fn quote(contract: &Contract, secs: i64, bid: &str, ask: &str) -> StrategyEvent {
    StrategyEvent::Quote(Quote {
        contract: contract.clone(),
        time: at(secs),
        bid: dec(bid),
        bid_size: 100,
        ask: dec(ask),
        ask_size: 100,
    })
}

pub fn fill(
    contract: &Contract,
    id: &str,
    direction: Direction,
    size: i64,
    price: &str,
    secs: i64,
) -> StrategyEvent {
    StrategyEvent::Executed(ExecutionReport {
        order: Order {
            id: id.to_string(),
            contract: contract.clone(),
            direction,
            status: OrderStatus::Filled,
        },
        block: block(direction, size, price, secs),
    })
}

pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Write an event file with the standard header followed by `rows`.
pub fn write_events(rows: &[&str]) -> tempfile::NamedTempFile {
    let mut content = String::from(EVENT_HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    write_temp(&content)
}
