//! Test runner that executes the device scenarios in order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::DevicesApi;
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::error::E2eResult;
use crate::scenarios::{Scenario, ScenarioContext, ScenarioOutcome};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub outcome: Option<ScenarioOutcome>,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

/// Main E2E test runner
pub struct TestRunner<D: Driver> {
    config: SuiteConfig,
    driver: D,
    api: DevicesApi,

    /// Output directory for results and failure screenshots
    output_dir: PathBuf,
}

impl<D: Driver> TestRunner<D> {
    pub fn new(config: SuiteConfig, driver: D, output_dir: impl Into<PathBuf>) -> E2eResult<Self> {
        let api = DevicesApi::new(config.clone())?;
        Ok(Self {
            config,
            driver,
            api,
            output_dir: output_dir.into(),
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run every scenario
    pub async fn run_all(&self) -> TestSuiteResult {
        self.run_scenarios(&Scenario::ALL).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&self, name: &str) -> E2eResult<TestSuiteResult> {
        let scenario = Scenario::find(name)?;
        Ok(self.run_scenarios(&[scenario]).await)
    }

    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let result = self.run_scenario(*scenario).await;
            match (&result.outcome, &result.error) {
                (Some(ScenarioOutcome::Completed), _) => {
                    passed += 1;
                    info!("✓ {} ({} ms)", result.name, result.duration_ms);
                }
                (Some(ScenarioOutcome::NoDevices), _) => {
                    passed += 1;
                    info!("✓ {} (no devices, nothing checked)", result.name);
                }
                (None, error) => {
                    failed += 1;
                    error!(
                        "✗ {} - {}",
                        result.name,
                        error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        TestSuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            started_at,
            duration_ms,
            results,
        }
    }

    /// Run one scenario on a fresh page opened at the UI base URL
    pub async fn run_scenario(&self, scenario: Scenario) -> TestResult {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name());

        let ctx = ScenarioContext::new(&self.driver, &self.api);
        let result = async {
            self.driver.new_page().await?;
            self.driver.goto(&self.config.base_url()).await?;
            scenario.run(ctx).await
        }
        .await;

        let (outcome, error, screenshot_path) = match result {
            Ok(outcome) => (Some(outcome), None, None),
            Err(e) => (None, Some(e.to_string()), self.capture_failure(scenario).await),
        };

        TestResult {
            name: scenario.name().to_string(),
            success: outcome.is_some(),
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
            screenshot_path,
        }
    }

    async fn capture_failure(&self, scenario: Scenario) -> Option<PathBuf> {
        let file_name = format!("{}.png", scenario.name().to_lowercase().replace(' ', "-"));
        let path = self.output_dir.join("screenshots").join(file_name);
        match self.driver.screenshot(&path).await {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Could not capture screenshot for '{}': {}", scenario.name(), e);
                None
            }
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
