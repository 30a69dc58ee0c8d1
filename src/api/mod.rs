//! Backend API gateway
//!
//! One thin wrapper per backend resource, all sharing a single
//! [`ApiClient`]. Responses are normalized into canonical models before
//! they leave this module.

mod auth;
mod client;
mod notifications;
mod residents;
mod technicians;
mod tickets;
mod users;

pub use auth::{AuthGateway, LoginOutcome};
pub use client::ApiClient;
pub use notifications::NotificationGateway;
pub use residents::ResidentGateway;
pub use technicians::TechnicianGateway;
pub use tickets::TicketGateway;
pub use users::{ReportFormat, ReportGateway, UserGateway};
