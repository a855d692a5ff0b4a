//! OHLCV price bars and ordered price series.

use chrono::{DateTime, Utc};

use crate::domain::error::AltairError;
use crate::domain::period::{Interval, Period};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Bars for one ticker over one period/interval, strictly increasing in time.
///
/// Gaps (weekends, holidays) are kept as-is and never filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    period: Period,
    interval: Interval,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Builds a series, rejecting empty input and out-of-order or duplicate
    /// timestamps as malformed upstream data.
    pub fn new(
        ticker: &str,
        period: Period,
        interval: Interval,
        bars: Vec<PriceBar>,
    ) -> Result<Self, AltairError> {
        if bars.is_empty() {
            return Err(AltairError::data_unavailable(ticker, "no bars returned"));
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(AltairError::data_unavailable(
                ticker,
                format!(
                    "timestamps not strictly increasing at {}",
                    pair[1].timestamp.to_rfc3339()
                ),
            ));
        }
        Ok(Self {
            ticker: ticker.to_string(),
            period,
            interval,
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn last(&self) -> &PriceBar {
        // non-empty by construction
        &self.bars[self.bars.len() - 1]
    }

    pub fn last_close(&self) -> f64 {
        self.last().close
    }
}

/// Trims and upper-cases a ticker symbol, rejecting blanks.
pub fn normalize_ticker(ticker: &str) -> Result<String, AltairError> {
    let t = ticker.trim();
    if t.is_empty() {
        return Err(AltairError::invalid("ticker must not be empty"));
    }
    Ok(t.to_uppercase())
}
