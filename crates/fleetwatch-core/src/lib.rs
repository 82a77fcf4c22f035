//! Fleetwatch Core Library
//!
//! Shared functionality for Fleetwatch components:
//! - `SQLite` pool helpers and the `define_database!` macro
//! - JSON configuration file loading
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::FileConfig;
pub use error::{Error, Result};
