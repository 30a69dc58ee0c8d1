//! Authentication state
//!
//! Handles:
//! - Session context (token + signed-in user)
//! - Access token persistence

pub mod session;
mod token_store;

pub use session::{Session, SessionContext};
pub use token_store::TokenStore;
