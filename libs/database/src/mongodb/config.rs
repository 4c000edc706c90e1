#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first_of};

/// Database used when neither the config nor the URI names one
pub const DEFAULT_DATABASE: &str = "users";

/// MongoDB connection settings
///
/// Only the endpoint is required. Pool sizing and timeouts are left to driver defaults.
///
/// # Example
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::new("mongodb://localhost:27017/users");
/// let config = MongoConfig::new("mongodb://localhost:27017").with_database("users");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MongoConfig {
    /// Connection string: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,

    /// Explicit database name, overriding the one in the URI
    pub database: Option<String>,

    /// Optional application name reported in server logs
    pub app_name: Option<String>,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: None,
            app_name: None,
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connection string with any `user:password@` credentials masked, for logging.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let authority_end = rest.find('/').unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => format!("{scheme}://***@{}", &rest[at + 1..]),
            None => self.url.clone(),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self::new("mongodb://localhost:27017")
    }
}

/// Environment variables:
/// - `MONGODB_URI` (fallbacks `MONGODB_URL`, `MONGO_URL`) - required connection string
/// - `MONGODB_DATABASE` (optional) - database name, otherwise taken from the URI
/// - `MONGODB_APP_NAME` (optional) - application name for server logs
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_first_of(&["MONGODB_URI", "MONGODB_URL", "MONGO_URL"])?;

        Ok(Self {
            url,
            database: std::env::var("MONGODB_DATABASE").ok(),
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
        })
    }
}
