//! Server configuration from environment variables
//!
//! ```bash
//! EVENTSTORE_DATA_FILE=/var/lib/eventstore/events   # default: ./.eventstore
//! EVENTSTORE_HOST=127.0.0.1                         # default: 0.0.0.0
//! EVENTSTORE_PORT=9000                              # default: 8080
//! EVENTSTORE_PASSWORD=secret                        # password of user "user"
//! EVENTSTORE_USERS=alice:pw1,bob:pw2                # optional extra users
//! ```

use std::env;
use std::path::{Path, PathBuf};

use crate::event_store::DEFAULT_DATA_FILE;

/// User name paired with `EVENTSTORE_PASSWORD`
pub const DEFAULT_USER: &str = "user";

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Everything the binary needs to start serving
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Absolute path of the data file
    pub data_file: PathBuf,
    /// Plain-text `(user, password)` pairs, hashed when auth is built
    pub credentials: Vec<(String, String)>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            credentials: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("EVENTSTORE_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("EVENTSTORE_PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "EVENTSTORE_PORT",
                value: port.clone(),
            })?;
        }

        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let data_file = lookup("EVENTSTORE_DATA_FILE").unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        config.data_file = if Path::new(&data_file).is_absolute() {
            PathBuf::from(data_file)
        } else {
            current_dir.join(data_file)
        };

        if let Some(password) = lookup("EVENTSTORE_PASSWORD") {
            config.credentials.push((DEFAULT_USER.to_string(), password));
        }

        // Format: "user1:pass1,user2:pass2"
        if let Some(users) = lookup("EVENTSTORE_USERS") {
            for entry in users.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                // Basic credentials split on ':' into exactly two parts, password non-empty
                let Some((user, password)) = entry
                    .split_once(':')
                    .filter(|(_, p)| !p.is_empty() && !p.contains(':'))
                else {
                    return Err(ConfigError::InvalidValue {
                        name: "EVENTSTORE_USERS",
                        value: entry.to_string(),
                    });
                };
                config.credentials.push((user.to_string(), password.to_string()));
            }
        }

        Ok(config)
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
