//! Market data access port trait.

use crate::domain::error::AltairError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::{Interval, Period};

/// An upstream provider of OHLCV bars.
///
/// Implementations report every failure (network error, unknown ticker,
/// empty or malformed response) as `AltairError::DataUnavailable`.
pub trait MarketDataPort {
    fn fetch_series(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, AltairError>;

    /// Tickers the provider holds data for at `interval`, sorted. Providers
    /// without a catalogue reject the call.
    fn list_tickers(&self, _interval: Interval) -> Result<Vec<String>, AltairError> {
        Err(AltairError::invalid("this data source cannot list tickers"))
    }
}

impl<T: MarketDataPort + ?Sized> MarketDataPort for Box<T> {
    fn fetch_series(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, AltairError> {
        (**self).fetch_series(ticker, period, interval)
    }

    fn list_tickers(&self, interval: Interval) -> Result<Vec<String>, AltairError> {
        (**self).list_tickers(interval)
    }
}
