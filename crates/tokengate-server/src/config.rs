use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use tokengate_core::GateConfig;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: GateConfig,

    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Sled,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_kind")]
    pub kind: BackendKind,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

fn default_bind_address() -> SocketAddr {
    std::env::var("TOKENGATE_BIND_ADDRESS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3001)))
}

fn default_cors_origin() -> Option<String> {
    Some("http://localhost".to_string())
}

fn default_backend_kind() -> BackendKind {
    BackendKind::Redis
}

fn default_data_dir() -> PathBuf {
    std::env::var("TOKENGATE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/var/lib/tokengate"))
}

fn default_redis_url() -> String {
    std::env::var("TOKENGATE_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            data_dir: default_data_dir(),
            redis_url: default_redis_url(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("TOKENGATE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        let config = if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.auth.validate()?;
        Ok(config)
    }
}
