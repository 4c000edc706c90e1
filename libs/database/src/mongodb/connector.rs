use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tracing::debug;

use super::{DEFAULT_DATABASE, MongoConfig};

/// Error type for MongoDB connection setup
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("Invalid MongoDB configuration: {0}")]
    InvalidConfig(#[source] mongodb::error::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] mongodb::error::Error),
}

/// Build a client without touching the network.
///
/// The driver opens connections on first use, so a client returned from here may still
/// point at an unreachable server. Only malformed connection strings fail.
pub async fn connect_lazy(config: &MongoConfig) -> Result<Client, MongoError> {
    let mut options = ClientOptions::parse(&config.url)
        .await
        .map_err(MongoError::InvalidConfig)?;

    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options).map_err(MongoError::InvalidConfig)?;
    debug!(url = %config.redacted_url(), "MongoDB client constructed");
    Ok(client)
}

/// Run a single `ping` against the `admin` database. No retry.
pub async fn verify_connection(client: &Client) -> Result<(), MongoError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(MongoError::ConnectionFailed)
}

impl MongoConfig {
    /// Resolve the working database: explicit name, then the URI's default, then [`DEFAULT_DATABASE`].
    pub fn resolve_database(&self, client: &Client) -> Database {
        match self.database {
            Some(ref name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        }
    }
}
