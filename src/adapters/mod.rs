//! Concrete adapter implementations for ports.

pub mod cached_source;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod positions_csv;
pub mod yahoo;
