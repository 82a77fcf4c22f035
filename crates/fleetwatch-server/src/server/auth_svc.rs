//! Login and user administration handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::AppState;
use super::error::{ApiError, blocking};
use crate::auth::{Identity, Role, password};
use crate::storage::{DatabaseError, FleetDatabase, UserInfo};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    Role::User.as_str().to_string()
}

/// `POST /login`: exchange credentials for a bearer token (plain text body).
///
/// Unknown user and wrong password are indistinguishable to the caller,
/// in both response and hashing cost. The username is trimmed the same way
/// `add_user` trims it.
#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<String, ApiError> {
    let user = match state.db.get_user_by_username(req.username.trim()).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            blocking(move || password::verify_unknown_user(&req.password)).await?;
            warn!("Login for unknown user");
            return Err(ApiError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    let hash = user.password_hash.clone();
    let valid = blocking(move || password::verify_password(&req.password, &hash)).await?;
    if !valid {
        warn!("Failed login attempt");
        return Err(ApiError::Unauthorized);
    }

    let role = user
        .role()
        .map_err(|e| ApiError::Internal(format!("stored credential for {}: {e}", user.username)))?;
    let token = state.jwt.issue(&user.username, role)?;

    info!(role = %role, "User logged in");
    Ok(token)
}

/// `POST /admin/users`: create a credential.
#[instrument(
    skip(state, identity, req),
    fields(admin = %identity.subject, username = %req.username)
)]
pub async fn add_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    identity.require_admin()?;

    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".into()));
    }
    let role = req
        .role
        .parse::<Role>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let user = create_credential(&state.db, username, req.password, role).await?;
    info!(role = %role, "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }),
    ))
}

/// `GET /admin/users`: list credentials without their hashes.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    identity.require_admin()?;
    Ok(Json(state.db.list_users().await?))
}

/// Hash off the async runtime and store a new credential.
pub async fn create_credential(
    db: &FleetDatabase,
    username: &str,
    password: String,
    role: Role,
) -> Result<crate::storage::User, ApiError> {
    let hash = blocking(move || password::hash_password(&password)).await?;
    Ok(db.create_user(username, &hash, role).await?)
}

/// Create an admin credential unless `username` already exists.
/// Returns whether a credential was created.
pub async fn ensure_admin(
    db: &FleetDatabase,
    username: &str,
    password: String,
) -> Result<bool, ApiError> {
    match db.get_user_by_username(username).await {
        Ok(_) => Ok(false),
        Err(DatabaseError::NotFound(_)) => {
            create_credential(db, username, password, Role::Admin).await?;
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
