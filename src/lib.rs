pub mod api;
pub mod config;
pub mod db;
pub mod devices;
pub mod error;
pub mod memory;
pub mod telemetry;
