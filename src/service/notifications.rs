//! Notification inbox
//!
//! Clearing is confirmed by the server before the item leaves the local
//! list; a failed clear leaves the inbox untouched.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::refresh::{FocusRefresh, ScreenScope};
use crate::api::{ApiClient, NotificationGateway};
use crate::data::{Notification, NotificationId};
use crate::error::AppError;
use crate::metrics::ERRORS_TOTAL;

const SCREEN: &str = "notifications";
const MAX_CONCURRENT_CLEARS: usize = 4;

pub struct NotificationInbox {
    gateway: NotificationGateway,
    scope: ScreenScope,
    items: Vec<Notification>,
    loading: bool,
}

impl NotificationInbox {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            gateway: NotificationGateway::new(api),
            scope: ScreenScope::new(SCREEN),
            items: Vec::new(),
            loading: true,
        }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn reload(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.scope.run(self.gateway.list()).await;
        self.loading = false;

        match result {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                let e = e.into_fetch_failed();
                tracing::error!(error = %e, "Notification fetch failed");
                ERRORS_TOTAL.with_label_values(&[e.kind(), SCREEN]).inc();
                Err(e)
            }
        }
    }

    /// Clear a single notification
    ///
    /// Exactly one request; only `id` is removed once the server accepts it.
    pub async fn clear(&mut self, id: &NotificationId) -> Result<(), AppError> {
        if !self.items.iter().any(|n| &n.id == id) {
            return Err(AppError::InvalidInput(format!(
                "unknown notification: {}",
                id
            )));
        }

        self.scope
            .run(self.gateway.clear(id))
            .await
            .map_err(|e| {
                let e = e.into_action_failed();
                tracing::warn!(notification_id = %id, error = %e, "Notification clear failed");
                e
            })?;

        self.items.retain(|n| &n.id != id);
        Ok(())
    }

    /// Clear every notification currently listed
    ///
    /// Requests run concurrently (max 4 in flight). Items whose clear
    /// succeeded are removed; if any failed the first failure is returned.
    pub async fn clear_all(&mut self) -> Result<(), AppError> {
        let ids: Vec<NotificationId> = self.items.iter().map(|n| n.id.clone()).collect();
        if ids.is_empty() {
            return Ok(());
        }

        let gateway = &self.gateway;
        let results = self
            .scope
            .run(async {
                let outcomes = stream::iter(ids)
                    .map(|id| async move {
                        let result = gateway.clear(&id).await;
                        (id, result)
                    })
                    .buffer_unordered(MAX_CONCURRENT_CLEARS)
                    .collect::<Vec<_>>()
                    .await;
                Ok::<_, AppError>(outcomes)
            })
            .await?;

        let mut cleared = HashSet::new();
        let mut first_error = None;
        for (id, result) in results {
            match result {
                Ok(()) => {
                    cleared.insert(id);
                }
                Err(e) => {
                    tracing::warn!(notification_id = %id, error = %e, "Notification clear failed");
                    first_error.get_or_insert(e.into_action_failed());
                }
            }
        }

        self.items.retain(|n| !cleared.contains(&n.id));
        tracing::debug!(cleared = cleared.len(), remaining = self.items.len(), "Cleared notifications");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl FocusRefresh for NotificationInbox {
    fn scope(&self) -> &ScreenScope {
        &self.scope
    }

    async fn refresh(&mut self) -> Result<(), AppError> {
        self.reload().await
    }
}
