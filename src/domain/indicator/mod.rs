//! Technical indicator implementations.
//!
//! The calculations in [`sma`], [`ema`] and [`rsi`] are pure functions over a
//! slice of prices that return one `Option<f64>` per input point; `None`
//! marks the warmup region where the window has not filled yet.
//!
//! - `IndicatorType`: indicator identity + window (usable as a HashMap key)
//! - `IndicatorPoint`: one timestamped value
//! - `IndicatorSeries`: a series aligned 1:1 with its `PriceSeries`

pub mod ema;
pub mod rsi;
pub mod sma;

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::AltairError;
use crate::domain::ohlcv::PriceSeries;

pub const DEFAULT_RSI_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
}

impl IndicatorType {
    pub fn window(&self) -> usize {
        match self {
            IndicatorType::Sma(w) | IndicatorType::Ema(w) | IndicatorType::Rsi(w) => *w,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// Parses `SMA(20)`, `ema(50)` or a bare `rsi` (default window).
impl FromStr for IndicatorType {
    type Err = AltairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let split = match upper.split_once(':') {
            Some((name, digits)) => Some((name, digits)),
            None => match upper.split_once('(') {
                Some((name, rest)) => Some((
                    name,
                    rest.strip_suffix(')').ok_or_else(|| {
                        AltairError::invalid(format!("unterminated indicator '{}'", s))
                    })?,
                )),
                None => None,
            },
        };
        let (name, window) = match split {
            Some((name, digits)) => {
                let window = digits.trim().parse::<usize>().map_err(|_| {
                    AltairError::invalid(format!("invalid window in indicator '{}'", s))
                })?;
                (name.trim().to_string(), Some(window))
            }
            None => (upper.clone(), None),
        };

        match (name.as_str(), window) {
            ("SMA", Some(w)) => Ok(IndicatorType::Sma(w)),
            ("EMA", Some(w)) => Ok(IndicatorType::Ema(w)),
            ("RSI", w) => Ok(IndicatorType::Rsi(w.unwrap_or(DEFAULT_RSI_WINDOW))),
            ("SMA" | "EMA", None) => Err(AltairError::invalid(format!(
                "indicator '{}' needs a window, e.g. {}(20)",
                s, name
            ))),
            _ => Err(AltairError::invalid(format!("unknown indicator '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn label(&self) -> String {
        self.indicator_type.to_string()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }
}

/// Computes `indicator_type` over the close column of `series`.
pub fn compute_indicator(
    series: &PriceSeries,
    indicator_type: IndicatorType,
) -> Result<IndicatorSeries, AltairError> {
    let closes = series.closes();
    let raw = match indicator_type {
        IndicatorType::Sma(w) => sma::sma(&closes, w)?,
        IndicatorType::Ema(w) => ema::ema(&closes, w)?,
        IndicatorType::Rsi(w) => rsi::rsi(&closes, w)?,
    };

    let values = series
        .bars()
        .iter()
        .zip(raw)
        .map(|(bar, value)| IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type,
        values,
    })
}

pub(crate) fn check_window(window: usize) -> Result<(), AltairError> {
    if window == 0 {
        return Err(AltairError::invalid("indicator window must be positive"));
    }
    Ok(())
}
