//! Technician endpoints

use std::sync::Arc;

use serde::Serialize;

use super::ApiClient;
use crate::data::TicketId;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ResolveBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Clone)]
pub struct TechnicianGateway {
    api: Arc<ApiClient>,
}

impl TechnicianGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `PUT /technicians/update-time/:id`
    ///
    /// Accepting a ticket; the backend records the start time and moves the
    /// ticket to `in_progress`.
    pub async fn start_work(&self, id: &TicketId) -> Result<(), AppError> {
        let path = format!("/technicians/update-time/{}", urlencoding::encode(id.as_str()));
        self.api.put_empty(&path).await?;
        tracing::info!(ticket_id = %id, "Work started");
        Ok(())
    }

    /// `PUT /technicians/resolve-ticket/:id`
    pub async fn resolve_ticket(&self, id: &TicketId, message: Option<&str>) -> Result<(), AppError> {
        let path = format!("/technicians/resolve-ticket/{}", urlencoding::encode(id.as_str()));
        self.api.put(&path, &ResolveBody { message }).await?;
        tracing::info!(ticket_id = %id, "Ticket resolved");
        Ok(())
    }
}
