//! Devices E2E Test Suite
//!
//! This crate provides a Rust-controlled E2E test suite for the devices
//! management web application that:
//! - Drives a real browser through a long-lived Playwright session
//! - Wraps each page region in a page object (`DeviceForm`, `DevicesList`)
//! - Cross-checks what the UI renders against the devices REST API
//! - Runs the scenarios sequentially and writes a JSON report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                  │
//! │    ├── run_all() / run_test(name) -> TestSuiteResult        │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (fresh page at SuiteConfig::base_url)             │
//! │    ├── DeviceForm   ── Driver (Playwright JSON lines)       │
//! │    └── DevicesList  ── Driver + DevicesApi (reqwest)        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod server;

pub use api::DevicesApi;
pub use config::SuiteConfig;
pub use device::{Device, DeviceId, DeviceType, NewDevice};
pub use driver::{Driver, WaitState};
pub use error::{E2eError, E2eResult};
pub use pages::{DeviceForm, DevicesList};
pub use runner::TestRunner;
pub use scenarios::{Scenario, ScenarioContext, ScenarioOutcome};
