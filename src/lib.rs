//! Maintenance Desk - client core for a facility-maintenance ticketing backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Ticket dashboard, detail screen, notification inbox      │
//! │  - Role-gated action panel                                  │
//! │  - Focus-driven refresh, screen-scoped cancellation         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (reqwest)                     │
//! │  - One gateway per backend resource                         │
//! │  - Bearer token from the session context                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - Canonical ticket/history/notification records            │
//! │  - Alias-tolerant response normalization                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP gateways for the ticketing backend
//! - `service`: Screen state and client-side rules
//! - `data`: Canonical models and normalization
//! - `auth`: Session context and token persistence
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

use api::ApiClient;
use auth::{SessionContext, TokenStore};
use data::{Role, TicketId, TicketStatus};
use service::{
    ActionPanel, NotificationInbox, TicketDashboard, TicketDetailScreen, TicketFilter,
};

/// Shared state for one app run
///
/// Cloned into every screen. Holds the configuration, the session context
/// and the single API client all gateways share.
#[derive(Clone)]
pub struct DeskContext {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Access token and signed-in user
    pub session: Arc<SessionContext>,

    /// HTTP client bound to the session
    pub api: Arc<ApiClient>,
}

impl DeskContext {
    /// Initialize shared state
    ///
    /// # Steps
    /// 1. Open the token store
    /// 2. Restore a persisted session, if any
    /// 3. Build the API client
    ///
    /// # Errors
    /// Returns error if the token store is unreadable or the HTTP client
    /// cannot be built
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing desk context...");

        let store = TokenStore::file(&config.session.token_path);
        let session = Arc::new(SessionContext::new(store));
        if session.restore().await? {
            tracing::info!("Resuming previous session");
        }

        let api = Arc::new(ApiClient::new(&config.api, session.clone())?);
        tracing::info!(base_url = %config.api.base_url, "API client ready");

        Ok(Self {
            config: Arc::new(config),
            session,
            api,
        })
    }

    /// Build from an existing client; the session is taken from it
    pub fn with_client(config: config::AppConfig, api: Arc<ApiClient>) -> Self {
        Self {
            config: Arc::new(config),
            session: api.session().clone(),
            api,
        }
    }

    /// Filter configured for the dashboard, falling back to `all`
    pub fn default_filter(&self) -> TicketFilter {
        self.config
            .dashboard
            .default_filter
            .parse()
            .unwrap_or_default()
    }

    pub fn dashboard(&self) -> TicketDashboard {
        TicketDashboard::new(self.api.clone(), self.default_filter())
    }

    pub fn ticket_detail(&self, ticket_id: TicketId) -> Result<TicketDetailScreen, error::AppError> {
        TicketDetailScreen::open(self.api.clone(), ticket_id)
    }

    pub fn notifications(&self) -> NotificationInbox {
        NotificationInbox::new(self.api.clone())
    }

    /// Action panel for the signed-in user's role
    ///
    /// Without a known user every action is withheld.
    pub async fn action_panel(&self, ticket_id: TicketId, status: TicketStatus) -> ActionPanel {
        let role = self
            .session
            .role()
            .await
            .unwrap_or_else(|| Role::Other(String::new()));
        ActionPanel::new(self.api.clone(), ticket_id, role, status)
    }
}
