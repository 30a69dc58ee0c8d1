//! Service layer
//!
//! Screen state and client-side rules, separated from the HTTP gateways.
//! Each screen owns a [`ScreenScope`] and refreshes when it regains focus.

mod actions;
mod dashboard;
mod history;
mod notifications;
mod projection;
mod refresh;

pub use actions::{Action, ActionPanel, FollowUp, PermittedActions, RatingDraft};
pub use dashboard::TicketDashboard;
pub use history::{StatusHistoryFeed, TicketDetailScreen};
pub use notifications::NotificationInbox;
pub use projection::{TicketFilter, TicketSummary, project, summarize};
pub use refresh::{FocusController, FocusRefresh, Loadable, ScreenScope};
