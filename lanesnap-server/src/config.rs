use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration, read from an optional TOML file. CLI flags
/// override individual fields.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address
    pub addr: SocketAddr,
    /// SUMO network file loaded at startup
    pub network: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            network: None,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config() {
        let config: ServerConfig =
            toml::from_str("addr = \"0.0.0.0:9000\"\nnetwork = \"osm.net.xml\"\n").unwrap();
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
        assert_eq!(config.network, Some(PathBuf::from("osm.net.xml")));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.addr, ServerConfig::default().addr);
        assert!(config.network.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<ServerConfig>("listen = \"1.2.3.4:1\"").is_err());
    }
}
