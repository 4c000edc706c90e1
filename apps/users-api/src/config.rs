use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};

// Import MongoDB config from the database library
use database::mongodb::MongoConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://localhost:27017/users")),
                ("MONGODB_URL", None),
                ("MONGO_URL", None),
                ("MONGODB_DATABASE", None),
                ("HOST", None),
                ("PORT", None),
                ("APP_ENV", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.mongodb.url(), "mongodb://localhost:27017/users");
                assert_eq!(config.server.address(), "0.0.0.0:8080");
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.app.name, "users_api");
            },
        );
    }

    #[test]
    fn test_from_env_requires_mongodb_uri() {
        temp_env::with_vars_unset(["MONGODB_URI", "MONGODB_URL", "MONGO_URL"], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        temp_env::with_vars(
            [
                ("MONGODB_URI", Some("mongodb://localhost:27017")),
                ("PORT", Some("eighty")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
