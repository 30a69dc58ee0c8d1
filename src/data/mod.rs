//! Data layer module
//!
//! Canonical records and the normalization that produces them:
//! - Ticket, status history, notification, rating and user models
//! - Alias-tolerant decoding of backend responses

mod models;
pub mod normalize;

pub use models::*;
