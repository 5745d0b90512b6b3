use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Preset name, e.g. "PN12QP109"
    #[serde(default = "default_parameter_set")]
    pub parameter_set: String,
    /// Overrides the preset's switching-key decomposition (0 = RNS only)
    #[serde(default)]
    pub decomposition_base_log: Option<usize>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub trust: TrustConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TrustConfig {
    /// Let the proxy derive switching keys from two stored secret keys.
    /// Whoever runs the derivation sees both secrets.
    #[serde(default)]
    pub allow_proxy_key_derivation: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local_path: default_local_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            parameter_set: default_parameter_set(),
            decomposition_base_log: None,
            request_timeout_secs: default_request_timeout_secs(),
            storage: StorageConfig::default(),
            trust: TrustConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    55344
}
fn default_parameter_set() -> String {
    "PN12QP109".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_backend() -> StorageBackend {
    StorageBackend::Local
}
fn default_local_path() -> PathBuf {
    "keys".into()
}

impl Config {
    /// `hepre-server.toml` overlaid with `HEPRE_*` environment variables.
    /// Nested keys use a double underscore: `HEPRE_STORAGE__BACKEND=memory`.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file("hepre-server.toml"))
            .merge(Env::prefixed("HEPRE_").split("__"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config: Config = Self::figment().extract()?;
        Ok(config)
    }
}
