//! Application state management.
//!
//! The state contains:
//! - Configuration
//! - MongoDB client and the resolved database

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloned into each router (inexpensive Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    /// Working database (`MONGODB_DATABASE`, the URI default, or `users`)
    pub db: Database,
}
