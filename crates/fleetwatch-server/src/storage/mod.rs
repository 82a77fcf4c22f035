//! SQLite storage for the Fleetwatch server.
//!
//! Provides persistence for credentials, vehicle schedule records and
//! inspection results.

mod db;
mod models;
mod queries;


pub use db::FleetDatabase;
pub use fleetwatch_core::db::DatabaseError;
pub use models::*;
