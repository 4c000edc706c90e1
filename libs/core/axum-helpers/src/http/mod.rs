//! HTTP middleware.

pub mod security;

pub use security::security_headers;
