//! Authentication for the Fleetwatch server.
//!
//! Provides password hashing, JWT issuance/validation and the typed
//! identity that protected handlers receive.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::{Claims, Identity, Role};
pub use jwt::JwtManager;

/// Failures in the trust core.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// Salt generation, digest computation, or a malformed stored hash.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// No usable signing secret, or token encoding failed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Malformed, forged or expired token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Valid identity lacking the capability a route requires.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}
