//! Event replay through the portfolio and the measure list.
//!
//! ReplayConfig defines which standard indicators and measures are wired up
//! and how the event stream is split into periods.

use chrono::{Duration, NaiveDateTime};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use super::contract::Contract;
use super::error::TradecoreError;
use super::indicator::moving_average::MovingAverage;
use super::indicator::period_stats::{PeriodChange, PeriodOpen, PeriodVolume};
use super::indicator::price::{LastPrice, MidPrice};
use super::indicator::shared;
use super::market::{Quote, Trade};
use super::measure::execution_stats::{FillCount, RejectedOrders, TradedVolume};
use super::measure::pnl::RealizedPnl;
use super::measure::MeasureList;
use super::order::{ExecutionReport, Order};
use super::period::TimePeriodSplitter;
use super::portfolio::Portfolio;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyEvent {
    Trade(Trade),
    Quote(Quote),
    Executed(ExecutionReport),
    Updated(Order),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodConfig {
    pub length: Duration,
    pub epoch: NaiveDateTime,
    pub time_zone: Tz,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    pub period: Option<PeriodConfig>,
    pub collect_periodic: bool,
    pub moving_average_periods: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig {
            period: None,
            collect_periodic: false,
            moving_average_periods: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionLine {
    pub contract: Contract,
    pub size: i64,
    pub average_price: Option<Decimal>,
    pub open_lots: usize,
    pub realized_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLine {
    pub title: String,
    pub parameters: String,
    pub value: Option<String>,
    pub periods_recorded: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySummary {
    pub events: usize,
    pub positions: Vec<PositionLine>,
    pub indicators: Vec<IndicatorLine>,
}

pub struct Replay {
    portfolio: Portfolio,
    measures: MeasureList,
    events_applied: usize,
}

impl Replay {
    pub fn new(portfolio: Portfolio, measures: MeasureList) -> Self {
        Replay {
            portfolio,
            measures,
            events_applied: 0,
        }
    }

    /// Wire up the standard indicators and measures.
    pub fn standard(config: &ReplayConfig) -> Result<Self, TradecoreError> {
        let mut measures = match &config.period {
            Some(period) => MeasureList::with_splitter(Box::new(
                TimePeriodSplitter::in_time_zone(period.epoch, period.time_zone, period.length)?,
            )),
            None => MeasureList::new(),
        };
        let collect = config.collect_periodic;

        let last = shared(LastPrice::new(collect));
        let open = shared(PeriodOpen::new(collect));
        measures.add(shared(PeriodChange::new(last.clone(), open.clone(), collect)))?;
        measures.add(shared(MovingAverage::new(
            last.clone(),
            config.moving_average_periods,
            collect,
        )?))?;
        measures.add(last)?;
        measures.add(open)?;
        measures.add(shared(MidPrice::new(collect)))?;
        measures.add(shared(PeriodVolume::new(collect)))?;

        measures.add_measure(shared(FillCount::new(collect)))?;
        measures.add_measure(shared(TradedVolume::new(collect)))?;
        measures.add_measure(shared(RejectedOrders::new(collect)))?;
        measures.add_measure(shared(RealizedPnl::new(collect)))?;

        log::debug!("standard indicators: {:?}", measures.indicators().titles());
        Ok(Self::new(Portfolio::new(), measures))
    }

    /// Deliver one event. Executions are booked in the portfolio before the
    /// measures see them.
    pub fn apply(&mut self, event: &StrategyEvent) {
        match event {
            StrategyEvent::Trade(trade) => self.measures.trade_received(trade),
            StrategyEvent::Quote(quote) => self.measures.quote_received(quote),
            StrategyEvent::Executed(report) => {
                self.portfolio
                    .order_executed(report.contract(), report.block.clone());
                self.measures.order_executed(report);
            }
            StrategyEvent::Updated(order) => self.measures.order_updated(order),
        }
        self.events_applied += 1;
    }

    pub fn run(&mut self, events: &[StrategyEvent]) {
        for event in events {
            self.apply(event);
        }
        log::info!("replayed {} events", events.len());
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn measures(&self) -> &MeasureList {
        &self.measures
    }

    /// Positions sorted by contract, indicators in dispatch order.
    pub fn summary(&self) -> ReplaySummary {
        let mut positions: Vec<PositionLine> = self
            .portfolio
            .positions()
            .map(|p| PositionLine {
                contract: p.contract().clone(),
                size: p.size(),
                average_price: p.average_price(),
                open_lots: p.open_blocks().len(),
                realized_pnl: p.realized_pnl(),
            })
            .collect();
        positions.sort_by(|a, b| a.contract.cmp(&b.contract));

        let indicators = self
            .measures
            .indicators()
            .iter()
            .map(|handle| {
                let indicator = handle.borrow();
                let state = indicator.state();
                IndicatorLine {
                    title: state.descriptor().title.clone(),
                    parameters: state.descriptor().parameters.to_string(),
                    value: state.render_value(),
                    periods_recorded: state.periods_recorded(),
                }
            })
            .collect();

        ReplaySummary {
            events: self.events_applied,
            positions,
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filled_block::{Direction, FilledBlock};
    use crate::domain::order::OrderStatus;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn bhp() -> Contract {
        Contract::new("BHP", "ASX", "AUD")
    }

    fn trade(secs: i64, price: i64, size: i64) -> StrategyEvent {
        StrategyEvent::Trade(Trade {
            contract: bhp(),
            time: t(secs),
            price: Decimal::from(price),
            size,
        })
    }

    fn fill(secs: i64, direction: Direction, size: i64, price: i64) -> StrategyEvent {
        StrategyEvent::Executed(ExecutionReport {
            order: Order {
                id: format!("O-{secs}"),
                contract: bhp(),
                direction,
                status: OrderStatus::Filled,
            },
            block: FilledBlock::new(direction, size, Decimal::from(price), t(secs)).unwrap(),
        })
    }

    fn per_minute() -> ReplayConfig {
        ReplayConfig {
            period: Some(PeriodConfig {
                length: Duration::seconds(60),
                epoch: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                time_zone: chrono_tz::UTC,
            }),
            collect_periodic: true,
            moving_average_periods: 2,
        }
    }

    fn line<'a>(summary: &'a ReplaySummary, title: &str) -> &'a IndicatorLine {
        summary
            .indicators
            .iter()
            .find(|l| l.title == title)
            .unwrap()
    }

    #[test]
    fn standard_set_orders_dependents_last() {
        let replay = Replay::standard(&ReplayConfig::default()).unwrap();
        let titles = replay.measures().indicators().titles();
        let pos = |t: &str| titles.iter().position(|x| x == t).unwrap();

        assert!(pos("Last price") < pos("Period change"));
        assert!(pos("Period open") < pos("Period change"));
        assert!(pos("Last price") < pos("SMA(5)"));
        assert_eq!(replay.measures().measure_count(), 4);
    }

    #[test]
    fn fills_reach_portfolio_and_measures() {
        let mut replay = Replay::standard(&ReplayConfig::default()).unwrap();
        replay.run(&[
            fill(0, Direction::Long, 500, 80),
            fill(1, Direction::Short, 300, 50),
        ]);

        let pos = replay.portfolio().position(&bhp()).unwrap();
        assert_eq!(pos.size(), 200);
        assert_eq!(pos.average_price(), Some(Decimal::from(80)));

        let summary = replay.summary();
        assert_eq!(summary.events, 2);
        assert_eq!(line(&summary, "Fill count").value.as_deref(), Some("2"));
        assert_eq!(line(&summary, "Traded volume").value.as_deref(), Some("800"));
        assert_eq!(line(&summary, "Realized PnL").value.as_deref(), Some("-9000"));
    }

    #[test]
    fn period_boundaries_drive_moving_average() {
        let mut replay = Replay::standard(&per_minute()).unwrap();
        replay.run(&[
            trade(0, 10, 100),
            trade(30, 12, 100),
            trade(60, 20, 50),
            trade(125, 30, 10),
        ]);

        let summary = replay.summary();
        // Closes so far: 12 (minute 0) and 20 (minute 1).
        assert_eq!(line(&summary, "SMA(2)").value.as_deref(), Some("16"));
        assert_eq!(line(&summary, "Period volume").value.as_deref(), Some("10"));
        assert_eq!(line(&summary, "Period open").value.as_deref(), Some("30"));
        assert_eq!(line(&summary, "Period change").value.as_deref(), Some("0"));
        assert_eq!(line(&summary, "Last price").periods_recorded, 2);
    }

    #[test]
    fn without_period_config_hooks_never_fire() {
        let mut replay = Replay::standard(&ReplayConfig::default()).unwrap();
        replay.run(&[trade(0, 10, 100), trade(3600, 12, 100)]);

        let summary = replay.summary();
        assert_eq!(line(&summary, "SMA(5)").value, None);
        assert_eq!(line(&summary, "Period volume").value.as_deref(), Some("200"));
        assert_eq!(line(&summary, "Period change").value.as_deref(), Some("2"));
    }

    #[test]
    fn summary_positions_sorted_by_contract() {
        let mut replay = Replay::standard(&ReplayConfig::default()).unwrap();
        let cba = Contract::new("CBA", "ASX", "AUD");
        replay.apply(&StrategyEvent::Executed(ExecutionReport {
            order: Order {
                id: "O-9".into(),
                contract: cba.clone(),
                direction: Direction::Short,
                status: OrderStatus::Filled,
            },
            block: FilledBlock::new(Direction::Short, 10, Decimal::from(110), t(0)).unwrap(),
        }));
        replay.apply(&fill(1, Direction::Long, 5, 45));

        let summary = replay.summary();
        let contracts: Vec<&str> = summary
            .positions
            .iter()
            .map(|p| p.contract.symbol.as_str())
            .collect();
        assert_eq!(contracts, vec!["BHP", "CBA"]);
        assert_eq!(summary.positions[1].size, -10);
    }
}
