//! Remote ticket gateway
//!
//! List, detail, create, status history and priority assignment.

use std::sync::Arc;

use http::Method;
use serde::Serialize;

use super::ApiClient;
use crate::data::{NewTicket, Priority, StatusHistoryEntry, Ticket, TicketId, normalize};
use crate::error::AppError;

/// Body sent to `POST /tickets`
#[derive(Debug, Serialize)]
struct CreateTicketBody<'a> {
    title: &'a str,
    job_type: &'a str,
    location: &'a str,
    complaint: &'a str,
    special_note: &'a str,
}

#[derive(Debug, Serialize)]
struct AssignPriorityBody<'a> {
    priority: &'a str,
}

/// Ticket endpoints
#[derive(Clone)]
pub struct TicketGateway {
    api: Arc<ApiClient>,
}

impl TicketGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /tickets`
    pub async fn list(&self) -> Result<Vec<Ticket>, AppError> {
        let path = "/tickets";
        let body = self.api.get(path).await?;
        let tickets = normalize::ticket_list(body)
            .map_err(|reason| AppError::request_failed(&Method::GET, path, reason))?;

        tracing::debug!(count = tickets.len(), "Fetched tickets");
        Ok(tickets)
    }

    /// `GET /tickets/:id`
    pub async fn get(&self, id: &TicketId) -> Result<Ticket, AppError> {
        let path = format!("/tickets/{}", urlencoding::encode(id.as_str()));
        let body = self.api.get(&path).await?;
        normalize::ticket_detail(body)
            .map_err(|reason| AppError::request_failed(&Method::GET, &path, reason))
    }

    /// `POST /tickets`
    ///
    /// Returns `None` when the backend acknowledges the ticket without
    /// echoing a record that carries an identifier.
    pub async fn create(&self, ticket: &NewTicket) -> Result<Option<Ticket>, AppError> {
        let path = "/tickets";
        let body = CreateTicketBody {
            title: &ticket.title,
            job_type: &ticket.category,
            location: &ticket.location,
            complaint: &ticket.description,
            special_note: ticket.special_note.as_deref().unwrap_or(""),
        };

        let response = self.api.post(path, &body).await?;
        match normalize::ticket_detail(response) {
            Ok(created) => {
                tracing::info!(ticket_id = %created.id, "Ticket created");
                Ok(Some(created))
            }
            Err(reason) => {
                tracing::info!(%reason, "Ticket created; response carried no record");
                Ok(None)
            }
        }
    }

    /// `GET /progress-history/:id`, in API order
    pub async fn fetch_status_history(
        &self,
        id: &TicketId,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let path = format!("/progress-history/{}", urlencoding::encode(id.as_str()));
        let body = self.api.get(&path).await?;
        normalize::status_history(body)
            .map_err(|reason| AppError::request_failed(&Method::GET, &path, reason))
    }

    /// `PUT /tickets/assign-priority/:id`
    pub async fn assign_priority(&self, id: &TicketId, priority: &Priority) -> Result<(), AppError> {
        let path = format!("/tickets/assign-priority/{}", urlencoding::encode(id.as_str()));
        self.api
            .put(
                &path,
                &AssignPriorityBody {
                    priority: priority.as_str(),
                },
            )
            .await?;

        tracing::info!(ticket_id = %id, priority = %priority, "Priority assigned");
        Ok(())
    }
}
