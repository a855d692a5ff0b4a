//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod locale;
pub mod ohlcv;
pub mod period;
pub mod portfolio;
pub mod position;
pub mod quote;
pub mod settings;
