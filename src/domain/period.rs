//! Period-boundary detection over the event timestream.
//!
//! A [`PeriodSplitter`] classifies every incoming event against the current
//! period and tells the indicator list which lifecycle hooks to fire, and
//! whether they fire before or after the event itself is delivered.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::error::TradecoreError;
use super::market::{Quote, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodAction {
    StartBefore,
    StartAfter,
    EndBefore,
    EndAfter,
    RestartBefore,
    RestartAfter,
    NoAction,
}

impl PeriodAction {
    /// Hooks fire before the event is dispatched.
    pub fn is_before(self) -> bool {
        matches!(
            self,
            PeriodAction::StartBefore | PeriodAction::EndBefore | PeriodAction::RestartBefore
        )
    }

    /// `end_of_period` fires on every member.
    pub fn ends_period(self) -> bool {
        matches!(
            self,
            PeriodAction::EndBefore
                | PeriodAction::EndAfter
                | PeriodAction::RestartBefore
                | PeriodAction::RestartAfter
        )
    }

    /// `beginning_of_period` fires on every member.
    pub fn starts_period(self) -> bool {
        matches!(
            self,
            PeriodAction::StartBefore
                | PeriodAction::StartAfter
                | PeriodAction::RestartBefore
                | PeriodAction::RestartAfter
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSplitterResult {
    pub action: PeriodAction,
    pub time: DateTime<Utc>,
}

impl PeriodSplitterResult {
    pub fn new(action: PeriodAction, time: DateTime<Utc>) -> Self {
        PeriodSplitterResult { action, time }
    }
}

pub trait PeriodSplitter {
    fn check_trade(&mut self, trade: &Trade) -> PeriodSplitterResult;
    fn check_quote(&mut self, quote: &Quote) -> PeriodSplitterResult;
}

/// Fixed-length periods anchored at an epoch.
///
/// The first event yields `StartBefore`, events in the same bucket as the
/// previous one yield `NoAction`, and an event in any other bucket yields
/// `RestartBefore`. The result time is the start of the event's bucket.
#[derive(Debug, Clone)]
pub struct TimePeriodSplitter {
    epoch: DateTime<Utc>,
    length: Duration,
    last_bucket_start: Option<DateTime<Utc>>,
}

impl TimePeriodSplitter {
    pub fn new(epoch: DateTime<Utc>, length: Duration) -> Result<Self, TradecoreError> {
        if length <= Duration::zero() {
            return Err(TradecoreError::invalid_argument(format!(
                "period length must be positive, got {length}"
            )));
        }
        Ok(TimePeriodSplitter {
            epoch,
            length,
            last_bucket_start: None,
        })
    }

    /// Anchor the buckets at a wall-clock time in `tz`. Local times that do
    /// not map to exactly one instant (DST gaps and overlaps) are rejected.
    pub fn in_time_zone(
        epoch: NaiveDateTime,
        tz: Tz,
        length: Duration,
    ) -> Result<Self, TradecoreError> {
        let anchored = tz.from_local_datetime(&epoch).single().ok_or_else(|| {
            TradecoreError::invalid_argument(format!(
                "epoch {epoch} is ambiguous or does not exist in {tz}"
            ))
        })?;
        Self::new(anchored.with_timezone(&Utc), length)
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    /// Start of the bucket containing `time`. Times before the epoch fall
    /// into negative buckets.
    pub fn bucket_start(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        let elapsed = total_nanos(time - self.epoch);
        let into_bucket = elapsed.rem_euclid(total_nanos(self.length));
        time - from_nanos(into_bucket)
    }

    fn check_time(&mut self, time: DateTime<Utc>) -> PeriodSplitterResult {
        let bucket_start = self.bucket_start(time);
        let action = match self.last_bucket_start {
            None => PeriodAction::StartBefore,
            Some(last) if last == bucket_start => PeriodAction::NoAction,
            Some(_) => PeriodAction::RestartBefore,
        };
        if action != PeriodAction::NoAction {
            log::debug!("PERIOD: {action:?} at {bucket_start}");
        }
        self.last_bucket_start = Some(bucket_start);
        PeriodSplitterResult::new(action, bucket_start)
    }
}

const NANOS_PER_SEC: i128 = 1_000_000_000;

// Exact at any length; `num_nanoseconds` alone overflows past ~292 years.
fn total_nanos(d: Duration) -> i128 {
    i128::from(d.num_seconds()) * NANOS_PER_SEC + i128::from(d.subsec_nanos())
}

// Callers pass values below a valid Duration's magnitude.
fn from_nanos(nanos: i128) -> Duration {
    Duration::seconds((nanos / NANOS_PER_SEC) as i64)
        + Duration::nanoseconds((nanos % NANOS_PER_SEC) as i64)
}

impl PeriodSplitter for TimePeriodSplitter {
    fn check_trade(&mut self, trade: &Trade) -> PeriodSplitterResult {
        self.check_time(trade.time)
    }

    fn check_quote(&mut self, quote: &Quote) -> PeriodSplitterResult {
        self.check_time(quote.time)
    }
}
