//! CSV file market data adapter.
//!
//! Reads `<base_path>/<TICKER>_<interval>.csv` with the header
//! `timestamp,open,high,low,close,volume`. Timestamps are RFC 3339 or
//! `YYYY-MM-DD` (midnight UTC). The period is applied relative to the last
//! bar in the file.

use crate::domain::error::AltairError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::{Interval, Period};
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, NaiveDate, Utc};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", ticker, interval))
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn parse_field<T: FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    ticker: &str,
) -> Result<T, AltairError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(idx)
        .ok_or_else(|| AltairError::data_unavailable(ticker, format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| AltairError::data_unavailable(ticker, format!("invalid {} value: {}", name, e)))
}

impl MarketDataPort for CsvAdapter {
    fn fetch_series(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, AltairError> {
        let path = self.csv_path(ticker, interval);
        let content = fs::read_to_string(&path).map_err(|e| {
            AltairError::data_unavailable(ticker, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| AltairError::data_unavailable(ticker, format!("CSV parse error: {}", e)))?;

            let ts_str = record
                .get(0)
                .ok_or_else(|| AltairError::data_unavailable(ticker, "missing timestamp column"))?;
            let timestamp = parse_timestamp(ts_str.trim()).ok_or_else(|| {
                AltairError::data_unavailable(ticker, format!("invalid timestamp '{}'", ts_str))
            })?;

            bars.push(PriceBar {
                timestamp,
                open: parse_field(&record, 1, "open", ticker)?,
                high: parse_field(&record, 2, "high", ticker)?,
                low: parse_field(&record, 3, "low", ticker)?,
                close: parse_field(&record, 4, "close", ticker)?,
                volume: parse_field(&record, 5, "volume", ticker)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(start) = bars.last().and_then(|b| period.window_start(b.timestamp)) {
            bars.retain(|b| b.timestamp >= start);
        }

        PriceSeries::new(ticker, period, interval, bars)
    }

    /// Tickers with a `<TICKER>_<interval>.csv` file, sorted.
    fn list_tickers(&self, interval: Interval) -> Result<Vec<String>, AltairError> {
        let entries = fs::read_dir(&self.base_path)?;

        let suffix = format!("_{}.csv", interval);
        let mut tickers = Vec::new();

        for entry in entries {
            let name = entry?.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(&suffix) {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
