use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
///
/// Every section is optional; omitted keys fall back to the defaults below.
///
/// Example YAML:
/// ```yaml
/// server:
///   host: 0.0.0.0
///   port: 8000
///   read_timeout: 10s
///   cors:
///     allowed_origins:
///       - http://localhost:3000
/// model:
///   name: Credit Risk Assessment Model
///   version: 1.0.0
///   accuracy: 0.82
///   trained_on: "2026-02-01"
/// dataset:
///   applications: 500
///   output: loan_applications.csv
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum time to wait for a full request, e.g. "10s" or "500ms"
    pub read_timeout: String,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            read_timeout: "10s".to_string(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "https://creditrisk.gilliannewton.com".to_string(),
                "https://creditrisk-frontend.vercel.app".to_string(),
            ],
        }
    }
}

/// Metadata reported by `/api/v1/model/info`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub name: String,
    pub version: String,
    pub accuracy: f64,
    /// ISO date, e.g. "2026-02-01"
    pub trained_on: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "Credit Risk Assessment Model".to_string(),
            version: "1.0.0".to_string(),
            accuracy: 0.82,
            trained_on: "2026-02-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Number of synthetic applications to generate
    pub applications: usize,
    pub output: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            applications: 500,
            output: PathBuf::from("loan_applications.csv"),
        }
    }
}
