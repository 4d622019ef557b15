//! Error types for E2E testing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Devices app not ready at {url} after {attempts} attempts")]
    NotReady { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Playwright driver exited unexpectedly")]
    DriverClosed,

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unsupported device type: {0}")]
    UnsupportedDeviceType(String),

    #[error("Device not found in API: {0}")]
    DeviceNotFound(String),

    #[error("Devices API call failed: {action} ({target}): {source}")]
    Api {
        action: &'static str,
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
