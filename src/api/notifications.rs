//! Notification endpoints

use std::sync::Arc;

use http::Method;

use super::ApiClient;
use crate::data::{Notification, NotificationId, normalize};
use crate::error::AppError;

#[derive(Clone)]
pub struct NotificationGateway {
    api: Arc<ApiClient>,
}

impl NotificationGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /notifications`
    pub async fn list(&self) -> Result<Vec<Notification>, AppError> {
        let path = "/notifications";
        let body = self.api.get(path).await?;
        normalize::notifications(body)
            .map_err(|reason| AppError::request_failed(&Method::GET, path, reason))
    }

    /// `POST /notifications/:id` clears one notification
    pub async fn clear(&self, id: &NotificationId) -> Result<(), AppError> {
        let path = format!("/notifications/{}", urlencoding::encode(&id.0));
        self.api.post_empty(&path).await?;
        tracing::debug!(notification_id = %id, "Notification cleared");
        Ok(())
    }
}
