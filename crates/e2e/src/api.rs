//! Devices REST API client

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::config::SuiteConfig;
use crate::device::{Device, DeviceId, NewDevice};
use crate::error::{E2eError, E2eResult};

/// Client for the devices collection resource
#[derive(Debug, Clone)]
pub struct DevicesApi {
    client: Client,
    config: SuiteConfig,
}

impl DevicesApi {
    pub fn new(config: SuiteConfig) -> E2eResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, config })
    }

    /// List every device
    pub async fn fetch_devices(&self) -> E2eResult<Vec<Device>> {
        let url = self.config.api_url_devices();
        let request = self.client.get(&url);
        fetch_json(request)
            .await
            .map_err(|e| failure("fetch devices", url, e))
    }

    /// Look a device up by name in the full listing.
    ///
    /// The API has no query by name, so this filters client-side.
    pub async fn fetch_device_by_name(&self, system_name: &str) -> E2eResult<Option<Device>> {
        let devices = self.fetch_devices().await?;
        Ok(devices.into_iter().find(|d| d.system_name == system_name))
    }

    /// Replace the mutable fields of an existing device
    pub async fn update_device(&self, device: &Device) -> E2eResult<()> {
        let url = self.config.device_url(device.id.as_str());
        let request = self.client.put(&url).json(&device.fields());
        send(request)
            .await
            .map(drop)
            .map_err(|e| failure("update device", url, e))
    }

    pub async fn create_device(&self, device: &NewDevice) -> E2eResult<()> {
        let url = self.config.api_url_devices();
        let request = self.client.post(&url).json(device);
        send(request)
            .await
            .map(drop)
            .map_err(|e| failure("create device", format!("{} ({})", url, device.system_name), e))
    }

    pub async fn delete_device(&self, id: &DeviceId) -> E2eResult<()> {
        let url = self.config.device_url(id.as_str());
        let request = self.client.delete(&url);
        send(request)
            .await
            .map(drop)
            .map_err(|e| failure("delete device", url, e))
    }
}

async fn send(request: RequestBuilder) -> reqwest::Result<reqwest::Response> {
    let response = request.send().await?;
    debug!("{} {}", response.status(), response.url());
    response.error_for_status()
}

async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> reqwest::Result<T> {
    send(request).await?.json::<T>().await
}

fn failure(action: &'static str, target: String, source: reqwest::Error) -> E2eError {
    error!(action, target = %target, "devices API call failed: {}", source);
    E2eError::Api {
        action,
        target,
        source,
    }
}
