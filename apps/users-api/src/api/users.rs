//! Users API routes
//!
//! This module wires up the users domain to HTTP routes.

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

use crate::state::AppState;

/// Create users router
pub fn router(state: &AppState) -> Router {
    let repository = MongoUserRepository::new(&state.db);
    let service = UserService::new(repository);
    handlers::router(service)
}

/// Ensure the unique email index exists.
///
/// Failure is logged and startup continues: the service pre-check still guards
/// uniqueness, just without the race protection of the index.
pub async fn init_indexes(state: &AppState) {
    let repository = MongoUserRepository::new(&state.db);
    if let Err(e) = repository.init_indexes().await {
        tracing::error!(error = %e, "Failed to create user indexes");
    }
}
