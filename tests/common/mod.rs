#![allow(dead_code)]

use altair::domain::error::AltairError;
pub use altair::domain::ohlcv::{PriceBar, PriceSeries};
use altair::domain::period::{Interval, Period};
use altair::ports::clock_port::Clock;
use altair::ports::data_port::MarketDataPort;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory provider keyed by upper-case ticker. Counts every fetch.
pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    calls: Cell<usize>,
    offline: Cell<bool>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
            offline: Cell::new(false),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_closes(self, ticker: &str, closes: &[f64]) -> Self {
        self.with_bars(ticker, bars_from_closes(closes))
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// While offline every fetch fails as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_series(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, AltairError> {
        self.calls.set(self.calls.get() + 1);
        if self.offline.get() {
            return Err(AltairError::data_unavailable(ticker, "connection refused"));
        }
        if let Some(reason) = self.errors.get(ticker) {
            return Err(AltairError::data_unavailable(ticker, reason.clone()));
        }
        match self.data.get(ticker) {
            Some(bars) => PriceSeries::new(ticker, period, interval, bars.clone()),
            None => Err(AltairError::data_unavailable(ticker, "unknown ticker")),
        }
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock(Rc<Cell<DateTime<Utc>>>);

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Rc::new(Cell::new(now)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
}

pub fn make_bar(day: i64, close: f64) -> PriceBar {
    PriceBar {
        timestamp: start_time() + Duration::days(day),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i as i64, c))
        .collect()
}

pub fn generate_closes(count: usize, start_price: f64) -> Vec<f64> {
    (0..count).map(|i| start_price + i as f64).collect()
}

pub fn make_series(ticker: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        ticker,
        Period::OneYear,
        Interval::OneDay,
        bars_from_closes(closes),
    )
    .unwrap()
}
