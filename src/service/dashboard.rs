//! Ticket dashboard
//!
//! The list screen shared by residents and technicians: the full ticket
//! collection, a loading flag, the current filter and ticket creation.

use std::sync::Arc;

use super::projection::{TicketFilter, TicketSummary, project, summarize};
use super::refresh::{FocusRefresh, ScreenScope};
use crate::api::{ApiClient, TicketGateway};
use crate::data::{NewTicket, Ticket};
use crate::error::AppError;
use crate::metrics::ERRORS_TOTAL;

const SCREEN: &str = "dashboard";

pub struct TicketDashboard {
    gateway: TicketGateway,
    scope: ScreenScope,
    tickets: Vec<Ticket>,
    filter: TicketFilter,
    loading: bool,
    last_error: Option<String>,
}

impl TicketDashboard {
    pub fn new(api: Arc<ApiClient>, filter: TicketFilter) -> Self {
        Self {
            gateway: TicketGateway::new(api),
            scope: ScreenScope::new(SCREEN),
            tickets: Vec::new(),
            filter,
            loading: true,
            last_error: None,
        }
    }

    pub fn filter(&self) -> TicketFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TicketFilter) {
        self.filter = filter;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Full, unfiltered collection
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Tickets under the current filter
    pub fn visible(&self) -> Vec<&Ticket> {
        project(&self.tickets, self.filter)
    }

    pub fn summary(&self) -> TicketSummary {
        summarize(&self.tickets)
    }

    /// Re-fetch the ticket list
    ///
    /// On failure the previous collection is kept and the error is logged.
    pub async fn reload(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.scope.run(self.gateway.list()).await;

        match result {
            Ok(tickets) => {
                self.tickets = tickets;
                self.last_error = None;
                self.loading = false;
                Ok(())
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                let e = e.into_fetch_failed();
                tracing::error!(error = %e, "Ticket fetch failed");
                ERRORS_TOTAL.with_label_values(&[e.kind(), SCREEN]).inc();
                self.last_error = Some(e.to_string());
                self.loading = false;
                Err(e)
            }
        }
    }

    /// Validate and submit a new ticket, then reload the list
    ///
    /// Blank required fields block submission without a request.
    pub async fn create_ticket(&mut self, draft: NewTicket) -> Result<Option<Ticket>, AppError> {
        let missing: Vec<&str> = [
            ("title", &draft.title),
            ("category", &draft.category),
            ("location", &draft.location),
            ("description", &draft.description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            tracing::debug!(?missing, "Ticket submission blocked");
            return Err(AppError::InvalidInput(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let draft = NewTicket {
            title: draft.title.trim().to_string(),
            category: draft.category.trim().to_string(),
            location: draft.location.trim().to_string(),
            description: draft.description.trim().to_string(),
            special_note: draft
                .special_note
                .map(|note| note.trim().to_string())
                .filter(|note| !note.is_empty()),
        };

        let created = self
            .scope
            .run(self.gateway.create(&draft))
            .await
            .map_err(|e| {
                let e = e.into_action_failed();
                tracing::warn!(error = %e, "Ticket create failed");
                e
            })?;

        self.reload().await?;
        Ok(created)
    }
}

impl FocusRefresh for TicketDashboard {
    fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    async fn refresh(&mut self) -> Result<(), AppError> {
        self.reload().await
    }
}
