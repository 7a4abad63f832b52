pub mod authority;
pub mod config;
pub mod error;
pub mod telemetry;
