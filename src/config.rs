use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key the snapshots are saved under
    pub storage_key: String,
    /// Node id embedded in generated post ids (0..=1023)
    pub node_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub series_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    pub sheet_fetch_timeout_secs: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:post_insights.db".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            store: StoreConfig {
                storage_key: "social-listening-data".to_string(),
                node_id: 0,
            },
            cache: CacheConfig { series_capacity: 128 },
            import: ImportConfig {
                sheet_fetch_timeout_secs: 30,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env_or("SERVER_PORT", defaults.server.port),
            },
            store: StoreConfig {
                storage_key: env::var("STORAGE_KEY").unwrap_or(defaults.store.storage_key),
                node_id: env_or("NODE_ID", defaults.store.node_id),
            },
            cache: CacheConfig {
                series_capacity: env_or("SERIES_CACHE_CAPACITY", defaults.cache.series_capacity),
            },
            import: ImportConfig {
                sheet_fetch_timeout_secs: env_or(
                    "SHEET_FETCH_TIMEOUT_SECS",
                    defaults.import.sheet_fetch_timeout_secs,
                ),
            },
        };

        if config.store.node_id > crate::infrastructure::id_generator::MAX_NODE_ID {
            anyhow::bail!("NODE_ID must be at most {}", crate::infrastructure::id_generator::MAX_NODE_ID);
        }
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn sheet_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.import.sheet_fetch_timeout_secs)
    }
}
