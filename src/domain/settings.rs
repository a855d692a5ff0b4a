//! Runtime settings assembled from the config file and CLI flags.

use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::error::AltairError;
use crate::domain::indicator::IndicatorType;
use crate::domain::locale::Language;
use crate::domain::period::{Interval, Period};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Yahoo,
}

impl FromStr for SourceKind {
    type Err = AltairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceKind::Csv),
            "yahoo" => Ok(SourceKind::Yahoo),
            other => Err(AltairError::invalid(format!("unknown data source '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: SourceKind,
    pub data_dir: PathBuf,
    pub cache_ttl_secs: i64,
    pub period: Period,
    pub interval: Interval,
    pub language: Language,
    pub indicators: Vec<IndicatorType>,
    pub watchlist: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source: SourceKind::Csv,
            data_dir: PathBuf::from("data"),
            cache_ttl_secs: 300,
            period: Period::OneYear,
            interval: Interval::OneDay,
            language: Language::Turkish,
            indicators: vec![
                IndicatorType::Ema(20),
                IndicatorType::Sma(50),
                IndicatorType::Rsi(14),
            ],
            watchlist: vec!["XU100.IS".to_string(), "^GSPC".to_string()],
        }
    }
}
