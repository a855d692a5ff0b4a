//! Last-price quote with change against a reference price.

use chrono::{DateTime, Utc};

use super::ohlcv::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub ticker: String,
    pub as_of: DateTime<Utc>,
    pub price: f64,
    pub reference: f64,
    pub change: f64,
    pub change_pct: f64,
}

impl Quote {
    /// Compares the last close with the previous bar's close. A single-bar
    /// series is compared with its own open instead.
    pub fn from_series(series: &PriceSeries) -> Self {
        let bars = series.bars();
        let last = series.last();
        let reference = if bars.len() > 1 {
            bars[bars.len() - 2].close
        } else {
            last.open
        };
        Self::new(series.ticker(), last.timestamp, last.close, reference)
    }

    /// Compares the last close with the last bar's open (session move).
    pub fn intraday(series: &PriceSeries) -> Self {
        let last = series.last();
        Self::new(series.ticker(), last.timestamp, last.close, last.open)
    }

    fn new(ticker: &str, as_of: DateTime<Utc>, price: f64, reference: f64) -> Self {
        let change = price - reference;
        let change_pct = if reference == 0.0 {
            0.0
        } else {
            change / reference * 100.0
        };
        Quote {
            ticker: ticker.to_string(),
            as_of,
            price,
            reference,
            change,
            change_pct,
        }
    }

    pub fn is_up(&self) -> bool {
        self.change > 0.0
    }
}
