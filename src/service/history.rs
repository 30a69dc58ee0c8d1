//! Status history feed and the ticket detail screen
//!
//! The detail screen loads the ticket and its history at the same time into
//! two separate slots. Each slot is published through its own watch channel
//! as soon as its fetch settles: a slow or failed detail fetch never holds
//! back a history that arrived, and the reverse.

use std::sync::Arc;

use tokio::sync::watch;

use super::refresh::{FocusRefresh, Loadable, ScreenScope};
use crate::api::{ApiClient, TicketGateway};
use crate::data::{StatusHistoryEntry, Ticket, TicketId};
use crate::error::AppError;
use crate::metrics::ERRORS_TOTAL;

const SCREEN: &str = "ticket_detail";

/// Read-only access to a ticket's transition log
#[derive(Clone)]
pub struct StatusHistoryFeed {
    gateway: TicketGateway,
}

impl StatusHistoryFeed {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            gateway: TicketGateway::new(api),
        }
    }

    /// Entries in API order; never re-sorted
    pub async fn fetch(&self, ticket_id: &TicketId) -> Result<Vec<StatusHistoryEntry>, AppError> {
        self.gateway.fetch_status_history(ticket_id).await
    }
}

pub struct TicketDetailScreen {
    ticket_id: TicketId,
    gateway: TicketGateway,
    feed: StatusHistoryFeed,
    scope: ScreenScope,
    ticket: watch::Sender<Loadable<Ticket>>,
    history: watch::Sender<Loadable<Vec<StatusHistoryEntry>>>,
}

impl TicketDetailScreen {
    /// Open the detail screen for `ticket_id`
    ///
    /// A blank id is rejected before any request is made.
    pub fn open(api: Arc<ApiClient>, ticket_id: TicketId) -> Result<Self, AppError> {
        if ticket_id.as_str().trim().is_empty() {
            return Err(AppError::InvalidInput("invalid ticket".to_string()));
        }

        let (ticket, _) = watch::channel(Loadable::Loading);
        let (history, _) = watch::channel(Loadable::Loading);

        Ok(Self {
            ticket_id,
            gateway: TicketGateway::new(api.clone()),
            feed: StatusHistoryFeed::new(api),
            scope: ScreenScope::new(SCREEN),
            ticket,
            history,
        })
    }

    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Current state of the ticket slot
    pub fn ticket(&self) -> Loadable<Ticket> {
        self.ticket.borrow().clone()
    }

    /// Current state of the history slot
    pub fn history(&self) -> Loadable<Vec<StatusHistoryEntry>> {
        self.history.borrow().clone()
    }

    /// Follow the ticket slot while a load is running
    pub fn watch_ticket(&self) -> watch::Receiver<Loadable<Ticket>> {
        self.ticket.subscribe()
    }

    pub fn watch_history(&self) -> watch::Receiver<Loadable<Vec<StatusHistoryEntry>>> {
        self.history.subscribe()
    }

    /// Fetch detail and history concurrently
    ///
    /// Each slot is written when its own fetch settles. Returns the first
    /// failure once both are done.
    pub async fn load(&self) -> Result<(), AppError> {
        let (ticket, history) = tokio::join!(self.load_ticket(), self.load_history());

        if matches!(ticket, Err(AppError::Cancelled)) || matches!(history, Err(AppError::Cancelled)) {
            return Err(AppError::Cancelled);
        }
        ticket.and(history)
    }

    /// Re-fetch only the ticket slot
    pub async fn load_ticket(&self) -> Result<(), AppError> {
        if !self.scope.is_mounted() {
            return Err(AppError::Cancelled);
        }
        self.ticket.send_replace(Loadable::Loading);
        let result = self.scope.run(self.gateway.get(&self.ticket_id)).await;
        settle(&self.ticket, result, &self.ticket_id, "ticket details")
    }

    /// Re-fetch only the history slot
    pub async fn load_history(&self) -> Result<(), AppError> {
        if !self.scope.is_mounted() {
            return Err(AppError::Cancelled);
        }
        self.history.send_replace(Loadable::Loading);
        let result = self.scope.run(self.feed.fetch(&self.ticket_id)).await;
        settle(&self.history, result, &self.ticket_id, "status history")
    }
}

/// Publish a finished fetch into its slot; cancelled work leaves it alone
fn settle<T>(
    slot: &watch::Sender<Loadable<T>>,
    result: Result<T, AppError>,
    ticket_id: &TicketId,
    what: &str,
) -> Result<(), AppError> {
    match result {
        Ok(value) => {
            slot.send_replace(Loadable::Ready(value));
            Ok(())
        }
        Err(AppError::Cancelled) => Err(AppError::Cancelled),
        Err(e) => {
            let e = e.into_fetch_failed();
            tracing::error!(ticket_id = %ticket_id, error = %e, "Failed to fetch {}", what);
            ERRORS_TOTAL.with_label_values(&[e.kind(), SCREEN]).inc();
            slot.send_replace(Loadable::Failed(e.to_string()));
            Err(e)
        }
    }
}

impl FocusRefresh for TicketDetailScreen {
    fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    async fn refresh(&mut self) -> Result<(), AppError> {
        self.load().await
    }
}
