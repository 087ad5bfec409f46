use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

/// Service configuration: where to listen and which upstreams to call.
///
/// Everything here is immutable for the lifetime of the process; handlers
/// only ever see clients derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub port: u16,

    /// Base URL of the geocoding upstream.
    pub geocoding_url: String,
    /// Base URL of the forecast upstream.
    pub forecast_url: String,

    /// Result language requested from the geocoder. Fixed per deployment.
    pub language: String,
    /// How many geocode candidates to request per lookup.
    pub geocode_count: u32,

    /// Timezone forwarded to the forecast upstream for local timestamps.
    pub timezone: String,

    /// Timeout applied to every outbound request. `0` disables it.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8989,
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            language: "es".to_string(),
            geocode_count: 6,
            timezone: "auto".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or return defaults if
    /// no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "clima", "clima-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Socket address the server should listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();

        assert_eq!(cfg.port, 8989);
        assert!(cfg.geocoding_url.contains("geocoding-api.open-meteo.com"));
        assert!(cfg.forecast_url.contains("api.open-meteo.com"));
        assert_eq!(cfg.language, "es");
        assert_eq!(cfg.geocode_count, 6);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let cfg: Config = toml::from_str("port = 9090\nlanguage = \"en\"").expect("should parse");

        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.host, "0.0.0.0");
        assert!(cfg.forecast_url.contains("open-meteo.com"));
    }

    #[test]
    fn bind_addr_combines_host_and_port() {
        let cfg = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };

        let addr = cfg.bind_addr().expect("should parse");
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn bind_addr_rejects_garbage_host() {
        let cfg = Config {
            host: "not a host".to_string(),
            ..Config::default()
        };

        assert!(cfg.bind_addr().is_err());
    }

    #[test]
    fn load_from_missing_file_errors() {
        let err = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
