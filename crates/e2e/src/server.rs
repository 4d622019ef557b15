//! Readiness checks for the devices app under test
//!
//! The app runs outside this suite. Before any scenario starts, the UI and
//! the API have to answer; nothing here retries scenario steps.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Poll `url` until it answers with a success status
pub async fn wait_until_ready(url: &str, timeout: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("{} is ready", url);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Readiness check on {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {}...", url);
                }
                // Connection refused is expected while the app is starting
                if !e.is_connect() {
                    warn!("Readiness check error: {}", e);
                }
            }
        }

        sleep(POLL_INTERVAL).await;
    }

    Err(E2eError::NotReady {
        url: url.to_string(),
        attempts,
    })
}

/// Wait for both the UI and the devices API
pub async fn wait_for_app(config: &SuiteConfig, timeout: Duration) -> E2eResult<()> {
    wait_until_ready(&config.base_url(), timeout).await?;
    wait_until_ready(&config.api_url_devices(), timeout).await
}
