//! Configuration management for the TVM gateway

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkConfig {
    /// Named network preset: dev, test or main.
    #[serde(default = "default_network")]
    pub network: String,
    /// Explicit node endpoints. Overrides the preset when non-empty.
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Opaque credential material handed to client acquisition.
    #[serde(default)]
    pub access_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
        }
    }
}

/// Hex-encoded key material, by key name.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    #[serde(default)]
    pub signing: HashMap<String, String>,
    #[serde(default)]
    pub cipher: HashMap<String, String>,
}

pub fn load_config(path: &str) -> Result<Config, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let config: Config = if config_str.is_empty() {
        // Provide sane defaults when the config file is absent
        Config {
            network: NetworkConfig {
                network: default_network(),
                endpoints: Vec::new(),
                access_key: None,
            },
            api: ApiConfig::default(),
            keys: KeysConfig::default(),
        }
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.network.network.is_empty() && config.network.endpoints.is_empty() {
        return Err("either network.network or network.endpoints must be set".into());
    }

    if config.api.port == 0 {
        return Err("api.port must be a non-zero port".into());
    }

    Ok(config)
}

fn default_network() -> String {
    "devnet".to_string()
}

fn default_api_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config("does-not-exist.toml").unwrap();
        assert_eq!(config.network.network, "devnet");
        assert_eq!(config.api.port, 8080);
        assert!(config.keys.signing.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [network]
            network = "main"
            endpoints = ["https://node.example/graphql"]
            access_key = "secret"

            [api]
            port = 9090

            [keys.signing]
            default = "00"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.network.network, "main");
        assert_eq!(config.network.endpoints.len(), 1);
        assert_eq!(config.network.access_key.as_deref(), Some("secret"));
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.keys.signing.get("default").unwrap(), "00");
    }
}
