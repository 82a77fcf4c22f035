//! Fleetwatch Server Library
//!
//! Core functionality for the fleet status service:
//! - SQLite storage for credentials, vehicles and inspection results
//! - Argon2 credential hashing and HS256 bearer tokens
//! - Authorization gate and HTTP handlers (axum)
//! - Startup ingestion of the vehicle schedule file

pub mod auth;
pub mod ingest;
pub mod server;
pub mod storage;
