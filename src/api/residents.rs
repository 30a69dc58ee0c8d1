//! Resident endpoints: ratings, close and reopen

use std::sync::Arc;

use http::Method;
use serde::Serialize;

use super::ApiClient;
use crate::data::{Rating, TicketId, normalize};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

#[derive(Clone)]
pub struct ResidentGateway {
    api: Arc<ApiClient>,
}

impl ResidentGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /ticket-reviews/:id`
    ///
    /// `None` when the ticket has not been rated.
    pub async fn get_rating(&self, id: &TicketId) -> Result<Option<Rating>, AppError> {
        let path = format!("/ticket-reviews/{}", urlencoding::encode(id.as_str()));
        let body = self.api.get(&path).await?;
        normalize::rating(body).map_err(|reason| AppError::request_failed(&Method::GET, &path, reason))
    }

    /// `POST /ticket-reviews/:id`
    pub async fn add_rating(&self, id: &TicketId, rating: &Rating) -> Result<(), AppError> {
        let path = format!("/ticket-reviews/{}", urlencoding::encode(id.as_str()));
        self.api.post(&path, rating).await?;
        tracing::info!(ticket_id = %id, rating = rating.rating, "Rating submitted");
        Ok(())
    }

    /// `PUT /residents/close-ticket/:id` with an optional comment
    pub async fn close_ticket(&self, id: &TicketId, message: Option<&str>) -> Result<(), AppError> {
        let path = format!("/residents/close-ticket/{}", urlencoding::encode(id.as_str()));
        self.api.put(&path, &MessageBody { message }).await?;
        tracing::info!(ticket_id = %id, "Ticket closed");
        Ok(())
    }

    /// `PUT /residents/reopen-ticket/:id` with the reason for reopening
    pub async fn reopen_ticket(&self, id: &TicketId, message: &str) -> Result<(), AppError> {
        let path = format!("/residents/reopen-ticket/{}", urlencoding::encode(id.as_str()));
        self.api
            .put(
                &path,
                &MessageBody {
                    message: Some(message),
                },
            )
            .await?;
        tracing::info!(ticket_id = %id, "Ticket reopened");
        Ok(())
    }
}
