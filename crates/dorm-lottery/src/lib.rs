pub mod config;
pub mod error;
pub mod lottery;
pub mod telemetry;
