//! Blocking HTTP client for the Yahoo Finance chart endpoint.

use std::time::Duration;
use tracing::debug;

use super::chart::parse_chart;
use crate::domain::error::AltairError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::{Interval, Period};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AltairError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AltairError::invalid(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AltairError> {
        let base_url = config
            .get_string("yahoo", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = config.get_int("yahoo", "timeout_secs", 10).max(1) as u64;
        Self::new(&base_url, Duration::from_secs(timeout))
    }

    fn chart_url(&self, ticker: &str, period: Period, interval: Interval) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, ticker, period, interval
        )
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_series(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries, AltairError> {
        let url = self.chart_url(ticker, period, interval);
        debug!(%url, "requesting chart");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AltairError::data_unavailable(ticker, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| AltairError::data_unavailable(ticker, e.to_string()))?;

        // error payloads carry a chart.error description worth surfacing
        match parse_chart(&body, ticker, period, interval) {
            Ok(series) if status.is_success() => Ok(series),
            Ok(_) => Err(AltairError::data_unavailable(ticker, format!("HTTP {}", status))),
            Err(e) => Err(e),
        }
    }
}
