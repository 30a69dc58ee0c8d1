//! User directory and report downloads

use std::sync::Arc;

use bytes::Bytes;
use http::Method;

use super::ApiClient;
use crate::data::{ReportFilters, UserProfile, normalize};
use crate::error::AppError;

#[derive(Clone)]
pub struct UserGateway {
    api: Arc<ApiClient>,
}

impl UserGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `GET /users/technicians?jobType=`
    pub async fn technicians_for(&self, job_type: &str) -> Result<Vec<UserProfile>, AppError> {
        let path = format!("/users/technicians?jobType={}", urlencoding::encode(job_type));
        let body = self.api.get(&path).await?;
        normalize::user_list(body).map_err(|reason| AppError::request_failed(&Method::GET, &path, reason))
    }
}

/// Ticket export formats offered by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Excel,
    Pdf,
}

impl ReportFormat {
    fn path(self) -> &'static str {
        match self {
            Self::Excel => "/utility/excel",
            Self::Pdf => "/utility/pdf",
        }
    }
}

#[derive(Clone)]
pub struct ReportGateway {
    api: Arc<ApiClient>,
}

impl ReportGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// `POST /utility/excel` or `POST /utility/pdf`; returns the file bytes
    pub async fn download(&self, format: ReportFormat, filters: &ReportFilters) -> Result<Bytes, AppError> {
        let bytes = self.api.post_for_bytes(format.path(), filters).await?;
        tracing::info!(format = ?format, size = bytes.len(), "Report downloaded");
        Ok(bytes)
    }
}
