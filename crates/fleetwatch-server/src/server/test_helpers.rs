//! Shared fixtures for router tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::{AppState, build_router};
use crate::auth::{JwtManager, Role, password};
use crate::storage::FleetDatabase;

pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const INSPECTOR: &str = "inspector";
pub const INSPECTOR_PASSWORD: &str = "inspector-pass";

pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    /// In-memory database seeded with one admin and one regular user.
    pub async fn new() -> Self {
        let db = FleetDatabase::open_in_memory().await.unwrap();
        for (name, pass, role) in [
            (ADMIN, ADMIN_PASSWORD, Role::Admin),
            (INSPECTOR, INSPECTOR_PASSWORD, Role::User),
        ] {
            let hash = password::hash_password(pass).unwrap();
            db.create_user(name, &hash, role).await.unwrap();
        }
        let jwt = Arc::new(JwtManager::new(b"test-secret", 3600).unwrap());
        Self {
            state: AppState { db, jwt },
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn token(&self, subject: &str, role: Role) -> String {
        self.state.jwt.issue(subject, role).unwrap()
    }

    /// Send a request and return (status, body text).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        json: Option<&str>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match json {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, String) {
        let body = serde_json::json!({ "username": username, "password": password }).to_string();
        self.send("POST", "/login", None, Some(&body)).await
    }
}
