//! Session context
//!
//! Holds the access token and signed-in user for one app run. Created on
//! login (or restored from the token store), destroyed on logout, and handed
//! to the API client at construction. There is no global token state.

use tokio::sync::RwLock;

use super::token_store::TokenStore;
use crate::data::{Role, UserProfile};
use crate::error::AppError;

/// Active session data
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token issued by `/auth/login`
    pub access_token: String,
    /// Signed-in user, once known
    pub user: Option<UserProfile>,
}

/// Shared session context
///
/// Reads are cheap and frequent (one per outgoing request); writes happen
/// only on login, logout and profile refresh.
pub struct SessionContext {
    state: RwLock<Option<Session>>,
    store: TokenStore,
}

impl SessionContext {
    /// Create an empty (signed-out) context backed by `store`
    pub fn new(store: TokenStore) -> Self {
        Self {
            state: RwLock::new(None),
            store,
        }
    }

    /// Restore a previously persisted token, if any
    ///
    /// # Returns
    /// `true` when a token was found
    pub async fn restore(&self) -> Result<bool, AppError> {
        let Some(token) = self.store.load().await? else {
            tracing::debug!("No persisted access token");
            return Ok(false);
        };

        *self.state.write().await = Some(Session {
            access_token: token,
            user: None,
        });
        tracing::info!("Session restored from token store");
        Ok(true)
    }

    /// Start a session after a successful login
    pub async fn begin(&self, access_token: String, user: Option<UserProfile>) -> Result<(), AppError> {
        self.store.save(&access_token).await?;

        let role = user.as_ref().map(|u| u.role.to_string());
        *self.state.write().await = Some(Session { access_token, user });

        tracing::info!(role = ?role, "Session started");
        Ok(())
    }

    /// Destroy the session and forget the persisted token
    pub async fn end(&self) -> Result<(), AppError> {
        *self.state.write().await = None;
        self.store.clear().await?;
        tracing::info!("Session ended");
        Ok(())
    }

    /// Record the user returned by `/auth/me`
    pub async fn set_user(&self, user: UserProfile) {
        if let Some(session) = self.state.write().await.as_mut() {
            session.user = Some(user);
        }
    }

    /// Token for the Authorization header, if signed in
    pub async fn bearer(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.as_ref().and_then(|s| s.user.clone())
    }

    pub async fn role(&self) -> Option<Role> {
        self.user().await.map(|u| u.role)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }
}
