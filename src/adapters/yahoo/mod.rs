//! Yahoo Finance chart API adapter.
//!
//! Payload decoding in [`chart`] is always built; the blocking HTTP client
//! in [`client`] needs the `yahoo` feature.

pub mod chart;
#[cfg(feature = "yahoo")]
pub mod client;
