//! Port traits the domain depends on; implementations live in `adapters`.

pub mod clock_port;
pub mod config_port;
pub mod data_port;
