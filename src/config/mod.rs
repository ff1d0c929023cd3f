//! Configuration module - environment variable parsing and gameplay constants

mod game;

pub use game::GameConfig;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default inbound messages per second allowed on one connection
pub const DEFAULT_INPUT_RATE_LIMIT: u32 = 120;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Directory served for the root document and static assets
    pub static_dir: PathBuf,
    /// Allowed client origins for CORS (empty = any origin)
    pub client_origins: Vec<String>,
    /// Max inbound WebSocket messages per second per connection
    pub input_rate_limit: u32,
    /// Fixed RNG seed for spawns and colours (random when unset)
    pub arena_seed: Option<u64>,
    /// World and gameplay constants, not overridable from the environment
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // PORT (as provided by most hosts) wins over SERVER_ADDR
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port.trim()),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
        };

        let input_rate_limit = match lookup("INPUT_RATE_LIMIT") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::Invalid("INPUT_RATE_LIMIT")),
            },
            None => DEFAULT_INPUT_RATE_LIMIT,
        };

        let arena_seed = lookup("ARENA_SEED")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("ARENA_SEED"))
            })
            .transpose()?;

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            client_origins,
            input_rate_limit,
            arena_seed,
            game: GameConfig::default(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(config.client_origins.is_empty());
        assert_eq!(config.input_rate_limit, DEFAULT_INPUT_RATE_LIMIT);
        assert_eq!(config.arena_seed, None);
        assert_eq!(config.game.update_rate, 60);
    }

    #[test]
    fn port_overrides_server_addr() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "7000"),
            ("SERVER_ADDR", "127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:7000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn parses_origins_and_seed() {
        let config = Config::from_lookup(lookup_from(&[
            ("CLIENT_ORIGIN", "http://a.test, http://b.test,"),
            ("ARENA_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.client_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.arena_seed, Some(42));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("SERVER_ADDR", "nowhere")])),
            Err(ConfigError::InvalidAddress)
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("INPUT_RATE_LIMIT", "0")])),
            Err(ConfigError::Invalid("INPUT_RATE_LIMIT"))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("ARENA_SEED", "abc")])),
            Err(ConfigError::Invalid("ARENA_SEED"))
        ));
    }
}
