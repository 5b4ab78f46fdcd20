pub mod config;
pub mod error;
pub mod workflow;
pub mod telemetry;
