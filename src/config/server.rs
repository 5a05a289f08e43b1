use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://cms.example.com").
    /// Used for stored logo URLs. Defaults to the listen address.
    pub public_base_url: Option<String>,
    /// Origins allowed to read the public endpoint. Empty allows any origin.
    pub cors_origins: Vec<String>,
    pub logo_max_bytes: usize,
    pub logo_max_dimension: u32,
    pub fetch_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("toplist-cms.db")
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            public_base_url: None,
            cors_origins: Vec::new(),
            logo_max_bytes: 2 * 1024 * 1024,
            logo_max_dimension: 512,
            fetch_timeout_secs: 15,
        }
    }
}

/// Settings read from a TOML file. Every key is optional.
///
/// ```toml
/// host = "0.0.0.0"
/// port = 8080
/// data_dir = "/var/lib/toplist-cms"
/// public_base_url = "https://cms.example.com"
/// cors_origins = ["https://cazinou.io"]
///
/// [logos]
/// max_bytes = 2097152
/// max_dimension = 512
/// fetch_timeout_secs = 15
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub public_base_url: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    #[serde(default)]
    pub logos: LogoSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoSection {
    pub max_bytes: Option<usize>,
    pub max_dimension: Option<u32>,
    pub fetch_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Overlays the values present in the file onto `config`.
    pub fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
        if self.public_base_url.is_some() {
            config.public_base_url = self.public_base_url;
        }
        if let Some(origins) = self.cors_origins {
            config.cors_origins = origins;
        }
        if let Some(v) = self.logos.max_bytes {
            config.logo_max_bytes = v;
        }
        if let Some(v) = self.logos.max_dimension {
            config.logo_max_dimension = v;
        }
        if let Some(v) = self.logos.fetch_timeout_secs {
            config.fetch_timeout_secs = v;
        }
    }
}
