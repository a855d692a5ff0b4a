//! TTL cache in front of a market data provider.
//!
//! Entries are keyed by `(ticker, period, interval)` and handed out as
//! `Arc<PriceSeries>`, so a fresh hit returns the very same series object.
//! When a refresh fails and an expired entry exists, the expired entry is
//! served instead of the error.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::error::AltairError;
use crate::domain::ohlcv::{PriceSeries, normalize_ticker};
use crate::domain::period::{Interval, Period};
use crate::ports::clock_port::{Clock, SystemClock};
use crate::ports::data_port::MarketDataPort;

pub const DEFAULT_TTL_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub period: Period,
    pub interval: Interval,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub series: Arc<PriceSeries>,
    pub fetched_at: DateTime<Utc>,
}

pub struct MarketDataSource<P, C = SystemClock> {
    provider: P,
    clock: C,
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl<P: MarketDataPort> MarketDataSource<P, SystemClock> {
    pub fn new(provider: P) -> Self {
        Self::with_clock(provider, SystemClock, Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl<P: MarketDataPort, C: Clock> MarketDataSource<P, C> {
    pub fn with_clock(provider: P, clock: C, ttl: Duration) -> Self {
        Self {
            provider,
            clock,
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_series(
        &mut self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Arc<PriceSeries>, AltairError> {
        let key = CacheKey {
            ticker: normalize_ticker(ticker)?,
            period,
            interval,
        };
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(&key) {
            if now - entry.fetched_at <= self.ttl {
                debug!(ticker = %key.ticker, %period, %interval, "cache hit");
                return Ok(Arc::clone(&entry.series));
            }
        }

        debug!(ticker = %key.ticker, %period, %interval, "fetching series");
        match self.provider.fetch_series(&key.ticker, period, interval) {
            Ok(series) => {
                let series = Arc::new(series);
                self.entries.insert(
                    key,
                    CacheEntry {
                        series: Arc::clone(&series),
                        fetched_at: now,
                    },
                );
                Ok(series)
            }
            Err(err) => match self.entries.get(&key) {
                Some(stale) => {
                    warn!(
                        ticker = %key.ticker,
                        fetched_at = %stale.fetched_at.to_rfc3339(),
                        error = %err,
                        "refresh failed, serving stale series"
                    );
                    Ok(Arc::clone(&stale.series))
                }
                None => Err(err),
            },
        }
    }

    /// Last close for each ticker. Tickers that cannot be fetched are
    /// reported in the second element instead of failing the batch.
    pub fn latest_closes(
        &mut self,
        tickers: &[String],
        period: Period,
        interval: Interval,
    ) -> (HashMap<String, f64>, Vec<AltairError>) {
        let mut prices = HashMap::with_capacity(tickers.len());
        let mut errors = Vec::new();

        for ticker in tickers {
            match self.get_series(ticker, period, interval) {
                Ok(series) => {
                    prices.insert(series.ticker().to_uppercase(), series.last_close());
                }
                Err(e) => {
                    warn!(%ticker, error = %e, "skipping ticker");
                    errors.push(e);
                }
            }
        }

        (prices, errors)
    }

    /// Drops every cached entry for `ticker`.
    pub fn invalidate(&mut self, ticker: &str) {
        let ticker = ticker.trim().to_uppercase();
        self.entries.retain(|k, _| k.ticker != ticker);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
