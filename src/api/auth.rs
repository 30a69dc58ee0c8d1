//! Authentication endpoints
//!
//! `login` starts the session context on success and `logout` ends it; no
//! other gateway touches the token.

use std::sync::Arc;

use http::Method;
use serde_json::Value;

use super::ApiClient;
use crate::data::{Credentials, Registration, UserProfile, normalize};
use crate::error::AppError;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub user: Option<UserProfile>,
}

#[derive(Clone)]
pub struct AuthGateway {
    api: Arc<ApiClient>,
}

impl AuthGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `POST /auth/login`
    ///
    /// On success the returned token becomes the active session.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, AppError> {
        let path = "/auth/login";
        let body = self.api.post(path, credentials).await?;

        let access_token = ["accessToken", "access_token"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::request_failed(&Method::POST, path, "response has no access token")
            })?;

        let user = body
            .get("user")
            .cloned()
            .and_then(|user| normalize::user(user).ok());

        self.api
            .session()
            .begin(access_token.clone(), user.clone())
            .await?;

        tracing::info!(role = ?user.as_ref().map(|u| u.role.to_string()), "Logged in");
        Ok(LoginOutcome { access_token, user })
    }

    /// `GET /auth/me`; also records the user on the session
    pub async fn me(&self) -> Result<UserProfile, AppError> {
        let path = "/auth/me";
        let body = self.api.get(path).await?;
        let user = normalize::user(body)
            .map_err(|reason| AppError::request_failed(&Method::GET, path, reason))?;

        self.api.session().set_user(user.clone()).await;
        Ok(user)
    }

    /// `POST /auth/register`
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, AppError> {
        let path = "/auth/register";
        let body = self.api.post(path, registration).await?;
        normalize::user(body).map_err(|reason| AppError::request_failed(&Method::POST, path, reason))
    }

    /// Local only: drops the session and the persisted token
    pub async fn logout(&self) -> Result<(), AppError> {
        self.api.session().end().await
    }
}
