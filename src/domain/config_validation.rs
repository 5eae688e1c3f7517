//! Configuration validation.
//!
//! Reads the `[period]` and `[indicators]` sections into a [`ReplayConfig`],
//! rejecting malformed values before any event is replayed.

use chrono::{Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::domain::error::TradecoreError;
use crate::domain::replay::{PeriodConfig, ReplayConfig};
use crate::ports::config_port::ConfigPort;

const EPOCH_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DEFAULT_EPOCH: &str = "1970-01-01T00:00:00";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TradecoreError> {
    build_replay_config(config).map(|_| ())
}

pub fn build_replay_config(config: &dyn ConfigPort) -> Result<ReplayConfig, TradecoreError> {
    let defaults = ReplayConfig::default();
    Ok(ReplayConfig {
        period: period_config(config)?,
        collect_periodic: parse_bool(config, "indicators", "collect_periodic")?
            .unwrap_or(defaults.collect_periodic),
        moving_average_periods: parse_positive(config, "indicators", "moving_average_periods")?
            .map_or(defaults.moving_average_periods, |n| n as usize),
    })
}

fn period_config(config: &dyn ConfigPort) -> Result<Option<PeriodConfig>, TradecoreError> {
    let epoch = parse_epoch(config)?;
    let time_zone = parse_time_zone(config)?;
    let Some(length_ms) = parse_positive(config, "period", "length_ms")? else {
        return Ok(None);
    };
    let period = PeriodConfig {
        length: Duration::milliseconds(length_ms),
        epoch,
        time_zone,
    };
    // The epoch has to exist in the zone; a spring-forward gap does not.
    if period.time_zone.from_local_datetime(&period.epoch).single().is_none() {
        return Err(TradecoreError::config_invalid(
            "period",
            "epoch",
            format!("{} is not a single instant in {}", period.epoch, period.time_zone),
        ));
    }
    Ok(Some(period))
}

fn value(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, TradecoreError> {
    let Some(raw) = value(config, section, key) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        Ok(_) => Err(TradecoreError::config_invalid(
            section,
            key,
            format!("{key} must be positive"),
        )),
        Err(_) => Err(TradecoreError::config_invalid(
            section,
            key,
            format!("'{raw}' is not an integer"),
        )),
    }
}

fn parse_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<bool>, TradecoreError> {
    let Some(raw) = value(config, section, key) else {
        return Ok(None);
    };
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(Some(true)),
        "false" | "no" | "0" => Ok(Some(false)),
        _ => Err(TradecoreError::config_invalid(
            section,
            key,
            format!("'{raw}' is not a boolean"),
        )),
    }
}

fn parse_epoch(config: &dyn ConfigPort) -> Result<NaiveDateTime, TradecoreError> {
    let raw = value(config, "period", "epoch").unwrap_or_else(|| DEFAULT_EPOCH.to_string());
    NaiveDateTime::parse_from_str(&raw, EPOCH_FORMAT).map_err(|_| {
        TradecoreError::config_invalid(
            "period",
            "epoch",
            "invalid epoch format, expected YYYY-MM-DDTHH:MM:SS",
        )
    })
}

fn parse_time_zone(config: &dyn ConfigPort) -> Result<Tz, TradecoreError> {
    match value(config, "period", "time_zone") {
        None => Ok(Tz::UTC),
        Some(raw) => raw.parse::<Tz>().map_err(|_| {
            TradecoreError::config_invalid(
                "period",
                "time_zone",
                format!("unknown time zone '{raw}'"),
            )
        }),
    }
}
