//! Backend HTTP client
//!
//! Every gateway call funnels through [`ApiClient`], which resolves the path
//! against the configured base URL, attaches the bearer token from the
//! session context when one exists, and folds every failure into
//! `AppError::RequestFailed`. No retries.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::auth::SessionContext;
use crate::config::ApiConfig;
use crate::error::AppError;
use crate::metrics::{API_REQUEST_DURATION_SECONDS, API_REQUESTS_TOTAL, endpoint_label};

/// Authenticated JSON client for the ticketing backend
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    /// Build a client from configuration
    ///
    /// No timeout is set unless `api.timeout_seconds` is configured.
    pub fn new(config: &ApiConfig, session: Arc<SessionContext>) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self::with_http_client(http, &config.base_url, session))
    }

    /// Wrap an existing reqwest client
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue one request and return the successful response
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, AppError> {
        let endpoint = endpoint_label(path);
        let timer = Instant::now();

        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = self.session.bearer().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let result = request.send().await;

        API_REQUEST_DURATION_SECONDS
            .with_label_values(&[method.as_str(), &endpoint])
            .observe(timer.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                API_REQUESTS_TOTAL
                    .with_label_values(&[method.as_str(), &endpoint, "transport_error"])
                    .inc();
                tracing::debug!(%method, path, error = %e, "Request did not complete");
                return Err(AppError::request_failed(&method, path, e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            API_REQUESTS_TOTAL
                .with_label_values(&[method.as_str(), &endpoint, "http_error"])
                .inc();
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|text| server_message(&text));
            let reason = match detail {
                Some(message) => format!("HTTP {}: {}", status.as_u16(), message),
                None => format!("HTTP {}", status.as_u16()),
            };
            tracing::debug!(%method, path, status = status.as_u16(), "Request rejected");
            return Err(AppError::request_failed(&method, path, reason));
        }

        API_REQUESTS_TOTAL
            .with_label_values(&[method.as_str(), &endpoint, "success"])
            .inc();
        Ok(response)
    }

    /// Issue a request and decode the JSON body; an empty body reads as `null`
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AppError> {
        let response = self.send(method.clone(), path, body).await?;
        let text = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(&method, path, e))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| AppError::request_failed(&method, path, format!("invalid JSON: {}", e)))
    }

    pub async fn get(&self, path: &str) -> Result<Value, AppError> {
        self.request_json(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, AppError> {
        let body = to_body(&Method::POST, path, body)?;
        self.request_json(Method::POST, path, Some(body)).await
    }

    /// POST without a request body
    pub async fn post_empty(&self, path: &str) -> Result<Value, AppError> {
        self.request_json(Method::POST, path, None).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, AppError> {
        let body = to_body(&Method::PUT, path, body)?;
        self.request_json(Method::PUT, path, Some(body)).await
    }

    /// PUT without a request body
    pub async fn put_empty(&self, path: &str) -> Result<Value, AppError> {
        self.request_json(Method::PUT, path, None).await
    }

    /// POST a JSON body and return the raw response bytes
    pub async fn post_for_bytes<B: Serialize>(&self, path: &str, body: &B) -> Result<Bytes, AppError> {
        let body = to_body(&Method::POST, path, body)?;
        let response = self.send(Method::POST, path, Some(body)).await?;
        response
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(&Method::POST, path, e))
    }
}

fn to_body<B: Serialize>(method: &Method, path: &str, body: &B) -> Result<Value, AppError> {
    serde_json::to_value(body)
        .map_err(|e| AppError::request_failed(method, path, format!("unserializable body: {}", e)))
}

/// Pull a human-readable message out of an error body, if it has one
fn server_message(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
