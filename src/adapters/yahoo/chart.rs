//! Decoding of `/v8/finance/chart` responses into a `PriceSeries`.

use chrono::DateTime;
use serde::Deserialize;

use crate::domain::error::AltairError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::{Interval, Period};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Parses a chart payload. Rows with a null open/high/low/close are skipped;
/// a missing volume counts as zero.
pub fn parse_chart(
    body: &str,
    ticker: &str,
    period: Period,
    interval: Interval,
) -> Result<PriceSeries, AltairError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| AltairError::data_unavailable(ticker, format!("malformed chart payload: {}", e)))?;

    if let Some(err) = response.chart.error {
        return Err(AltairError::data_unavailable(
            ticker,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AltairError::data_unavailable(ticker, "no chart result"))?;
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| AltairError::data_unavailable(ticker, "no quote data"))?;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };

        bars.push(PriceBar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    PriceSeries::new(ticker, period, interval, bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "TRY", "symbol": "THYAO.IS"},
                "timestamp": [1704171600, 1704258000, 1704344400],
                "indicators": {
                    "quote": [{
                        "open":   [250.0, null, 255.5],
                        "high":   [255.0, 258.0, 260.0],
                        "low":    [249.0, 251.0, 254.0],
                        "close":  [254.0, 256.0, 259.25],
                        "volume": [1200000, 900000, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parse_skips_null_rows() {
        let series = parse_chart(SAMPLE, "THYAO.IS", Period::FiveDays, Interval::OneDay).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].close, 254.0);
        assert_eq!(series.bars()[0].volume, 1_200_000);
        assert_eq!(series.last().close, 259.25);
        assert_eq!(series.last().volume, 0);
        assert_eq!(series.last().timestamp.timestamp(), 1704344400);
    }

    #[test]
    fn parse_reports_chart_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(body, "NOPE", Period::OneMonth, Interval::OneDay).unwrap_err();
        assert!(matches!(err, AltairError::DataUnavailable { reason, .. } if reason.starts_with("Not Found")));
    }

    #[test]
    fn parse_empty_result_is_unavailable() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err = parse_chart(body, "SPY", Period::OneDay, Interval::OneDay).unwrap_err();
        assert!(matches!(err, AltairError::DataUnavailable { .. }));
    }

    #[test]
    fn parse_garbage_is_unavailable() {
        let err = parse_chart("<html>", "SPY", Period::OneDay, Interval::OneDay).unwrap_err();
        assert!(matches!(err, AltairError::DataUnavailable { .. }));
    }
}
