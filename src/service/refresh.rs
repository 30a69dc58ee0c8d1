//! Screen lifetime and focus-driven refresh
//!
//! A [`ScreenScope`] lives as long as the screen that owns it. Every fetch a
//! screen issues runs inside its scope; unmounting cancels the scope and any
//! fetch still in flight resolves to `AppError::Cancelled` instead of writing
//! into discarded state.
//!
//! Refresh happens only when a screen regains focus. There is no timer and
//! no push invalidation.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::metrics::SCREEN_REFRESHES_TOTAL;

/// Lifetime of one mounted screen
#[derive(Debug)]
pub struct ScreenScope {
    name: &'static str,
    cancel: CancellationToken,
}

impl ScreenScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cancel: CancellationToken::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Run `work` unless the screen goes away first
    pub async fn run<T, F>(&self, work: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!(screen = self.name, "Abandoned in-flight request");
                Err(AppError::Cancelled)
            }
            result = work => result,
        }
    }

    /// Token for work spawned outside `run`
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel everything still running for this screen
    pub fn unmount(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(screen = self.name, "Screen unmounted");
            self.cancel.cancel();
        }
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// State of one independently loaded slot
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A screen whose data is re-fetched on focus
pub trait FocusRefresh {
    fn scope(&self) -> &ScreenScope;

    /// Re-fetch everything the screen shows
    fn refresh(&mut self) -> impl Future<Output = Result<(), AppError>>;
}

/// Drives a screen's refreshes from navigation focus events
pub struct FocusController<S> {
    screen: S,
    focus_events: u64,
}

impl<S: FocusRefresh> FocusController<S> {
    pub fn new(screen: S) -> Self {
        Self {
            screen,
            focus_events: 0,
        }
    }

    /// Screen became visible (first mount or navigation back to it)
    pub async fn on_focus(&mut self) -> Result<(), AppError> {
        self.focus_events += 1;
        let name = self.screen.scope().name();
        tracing::debug!(screen = name, focus = self.focus_events, "Screen focused");

        let result = self.screen.refresh().await;
        let outcome = match &result {
            Ok(()) => "success",
            Err(AppError::Cancelled) => "cancelled",
            Err(_) => "failure",
        };
        SCREEN_REFRESHES_TOTAL
            .with_label_values(&[name, outcome])
            .inc();
        result
    }

    pub fn focus_events(&self) -> u64 {
        self.focus_events
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    /// Screen leaves the navigation stack; in-flight work is cancelled
    pub fn unmount(self) -> S {
        self.screen.scope().unmount();
        self.screen
    }
}
