//! # Registry Configuration
//!
//! The verifier principal and the document hash format are fixed when a
//! registry is initialized and never change afterwards. They are passed in
//! explicitly, never read from ambient state.
//!
//! ```yaml
//! verifier: ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM
//! hash_format:
//!   kind: hex
//!   length: 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use idreg_core::{HashFormat, Principal};

/// Errors loading a registry configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid YAML or has invalid fields.
    #[error("invalid registry config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Initialization parameters of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The single principal allowed to verify identities.
    pub verifier: Principal,
    /// Format every document hash must satisfy.
    #[serde(default)]
    pub hash_format: HashFormat,
}

impl RegistryConfig {
    /// Configuration with the default (64 hex character) hash format.
    pub fn new(verifier: Principal) -> Self {
        Self {
            verifier,
            hash_format: HashFormat::default(),
        }
    }

    /// Replace the hash format.
    pub fn with_hash_format(mut self, hash_format: HashFormat) -> Self {
        self.hash_format = hash_format;
        self
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg = RegistryConfig::from_yaml_str(
            "verifier: deployer\nhash_format:\n  kind: ascii\n  max_length: 64\n",
        )
        .unwrap();
        assert_eq!(cfg.verifier.as_str(), "deployer");
        assert_eq!(cfg.hash_format, HashFormat::Ascii { max_length: 64 });
    }

    #[test]
    fn hash_format_defaults_to_sha256_hex() {
        let cfg = RegistryConfig::from_yaml_str("verifier: deployer\n").unwrap();
        assert_eq!(cfg.hash_format, HashFormat::default());
        assert_eq!(cfg, RegistryConfig::new(Principal::new("deployer").unwrap()));
    }

    #[test]
    fn rejects_invalid_verifier() {
        assert!(RegistryConfig::from_yaml_str("verifier: \"not a principal\"\n").is_err());
        assert!(RegistryConfig::from_yaml_str("hash_format:\n  kind: hex\n  length: 64\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RegistryConfig::load(Path::new("/nonexistent/idreg.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/idreg.yaml"));
    }
}
