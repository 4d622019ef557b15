//! Suite configuration
//!
//! The browser harness cannot read the devices app's own configuration, so
//! the host and ports of the app under test live here as the suite's single
//! source of truth. The defaults match a local development setup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// Where the devices app under test is reachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Scheme and host shared by the UI and the API
    pub host: String,

    /// Port serving the rendered UI
    pub ui_port: u16,

    /// Port serving the REST API
    pub api_port: u16,

    /// Path of the devices collection resource
    pub devices_path: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            ui_port: 3001,
            api_port: 3000,
            devices_path: "/devices".to_string(),
        }
    }
}

impl SuiteConfig {
    /// Parse a config from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "host must start with http:// or https://, got '{}'",
                self.host
            )));
        }
        if self.host.ends_with('/') {
            return Err(E2eError::Config(format!(
                "host must not end with '/', got '{}'",
                self.host
            )));
        }
        if self.ui_port == 0 || self.api_port == 0 {
            return Err(E2eError::Config("ports must be non-zero".to_string()));
        }
        if !self.devices_path.starts_with('/') {
            return Err(E2eError::Config(format!(
                "devices_path must start with '/', got '{}'",
                self.devices_path
            )));
        }
        Ok(())
    }

    /// Base URL of the rendered UI
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host, self.ui_port)
    }

    /// URL of the devices collection resource
    pub fn api_url_devices(&self) -> String {
        format!("{}:{}{}", self.host, self.api_port, self.devices_path)
    }

    /// URL of a single device resource
    pub fn device_url(&self, id: &str) -> String {
        format!("{}/{}", self.api_url_devices(), id)
    }
}
