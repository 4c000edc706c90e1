//! Database connectors.
//!
//! Currently MongoDB only. The process entry point owns the client: it builds it once at
//! startup, hands clones to repositories, and drops it on shutdown.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client construction, connection check, health ping
//! - `config` - `core_config::FromEnv` support for [`mongodb::MongoConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::new("mongodb://localhost:27017/users");
//! let client = mongodb::connect_lazy(&config).await?;
//! mongodb::verify_connection(&client).await?;
//! let db = config.resolve_database(&client);
//! ```

#[cfg(feature = "mongodb")]
pub mod mongodb;
