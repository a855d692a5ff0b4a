//! Configuration validation.
//!
//! Validates config fields before any data is fetched.

use chrono::Duration;

use crate::domain::error::AltairError;
use crate::domain::indicator::IndicatorType;
use crate::domain::locale::Language;
use crate::domain::period::{Interval, Period};
use crate::domain::settings::SourceKind;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), AltairError> {
    validate_source(config)?;
    validate_cache_ttl(config)?;
    validate_parsed::<Period>(config, "data", "period")?;
    validate_parsed::<Interval>(config, "data", "interval")?;
    validate_parsed::<Language>(config, "display", "language")?;
    validate_windows(config)?;
    Ok(())
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), AltairError> {
    if let Some(s) = config.get_string("data", "source") {
        s.parse::<SourceKind>()
            .map_err(|e| invalid("data", "source", e))?;
    }
    match config.get_string("data", "data_dir") {
        Some(dir) if dir.trim().is_empty() => Err(AltairError::ConfigInvalid {
            section: "data".to_string(),
            key: "data_dir".to_string(),
            reason: "data_dir must not be blank".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_cache_ttl(config: &dyn ConfigPort) -> Result<(), AltairError> {
    let Some(raw) = config.get_string("data", "cache_ttl_secs") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v > 0 && Duration::try_seconds(v).is_some() => Ok(()),
        _ => Err(AltairError::ConfigInvalid {
            section: "data".to_string(),
            key: "cache_ttl_secs".to_string(),
            reason: "cache_ttl_secs must be a positive number of seconds in range".to_string(),
        }),
    }
}

fn validate_parsed<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), AltairError>
where
    T: FromStr<Err = AltairError>,
{
    if let Some(value) = config.get_string(section, key) {
        value
            .parse::<T>()
            .map_err(|e| invalid(section, key, e))?;
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), AltairError> {
    for key in ["ema", "sma", "rsi"] {
        for item in config.get_list("indicators", key) {
            match item.parse::<usize>() {
                Ok(w) if w > 0 => {}
                _ => {
                    return Err(AltairError::ConfigInvalid {
                        section: "indicators".to_string(),
                        key: key.to_string(),
                        reason: format!("window '{}' must be a positive integer", item),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Indicators listed under `[indicators]`, e.g. `ema = 20, 50`.
/// `None` when the section names none.
pub fn configured_indicators(
    config: &dyn ConfigPort,
) -> Result<Option<Vec<IndicatorType>>, AltairError> {
    let mut out = Vec::new();
    for key in ["ema", "sma", "rsi"] {
        for item in config.get_list("indicators", key) {
            let parsed = format!("{}({})", key, item)
                .parse::<IndicatorType>()
                .map_err(|e| invalid("indicators", key, e))?;
            out.push(parsed);
        }
    }
    Ok(if out.is_empty() { None } else { Some(out) })
}

fn invalid(section: &str, key: &str, err: AltairError) -> AltairError {
    let reason = match err {
        AltairError::InvalidParameter { reason } => reason,
        other => other.to_string(),
    };
    AltairError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
