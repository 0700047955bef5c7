use serde::Deserialize;
use std::time::Duration;

use crate::db::PoolSettings;
use crate::services::relay::RelayConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the video generation service
    #[serde(default = "default_generation_service_url")]
    pub generation_service_url: String,

    /// Shared secret used to verify webhook signatures
    pub webhook_secret: String,

    /// PostgreSQL connection string. Jobs are kept in memory when unset.
    pub database_url: Option<String>,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_database_min_connections")]
    pub database_min_connections: u32,

    #[serde(default = "default_database_acquire_timeout_secs")]
    pub database_acquire_timeout_secs: u64,

    /// Push gateway endpoint. Notifications are only logged when unset.
    pub push_gateway_url: Option<String>,

    #[serde(default = "default_create_timeout_secs")]
    pub create_timeout_secs: u64,

    #[serde(default = "default_status_timeout_secs")]
    pub status_timeout_secs: u64,

    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_generation_service_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_database_max_connections() -> u32 {
    10
}

fn default_database_min_connections() -> u32 {
    1
}

fn default_database_acquire_timeout_secs() -> u64 {
    5
}

fn default_create_timeout_secs() -> u64 {
    30
}

fn default_status_timeout_secs() -> u64 {
    10
}

fn default_notify_timeout_secs() -> u64 {
    5
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            create_timeout: Duration::from_secs(self.create_timeout_secs),
            status_timeout: Duration::from_secs(self.status_timeout_secs),
            notify_timeout: Duration::from_secs(self.notify_timeout_secs),
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            acquire_timeout: Duration::from_secs(self.database_acquire_timeout_secs),
        }
    }
}
