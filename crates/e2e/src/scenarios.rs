//! Device test scenarios
//!
//! Each scenario expects a page already opened at the UI base URL and leaves
//! the app's data as it found it.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::DevicesApi;
use crate::device::{DeviceType, NewDevice};
use crate::driver::Driver;
use crate::error::{E2eError, E2eResult};
use crate::pages::{DeviceForm, DevicesList};

pub const RENAMED_DEVICE_NAME: &str = "Renamed Device";

/// Device created and removed through the UI
pub fn sample_device() -> NewDevice {
    NewDevice::new("DESKTOP-XYZ", "512", DeviceType::Mac)
}

/// How a scenario ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Completed,
    /// Nothing was listed, so nothing was changed or checked
    NoDevices,
}

/// What a scenario runs against
#[derive(Clone, Copy)]
pub struct ScenarioContext<'a> {
    pub driver: &'a dyn Driver,
    pub api: &'a DevicesApi,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(driver: &'a dyn Driver, api: &'a DevicesApi) -> Self {
        Self { driver, api }
    }

    pub fn devices_list(&self) -> DevicesList<'a> {
        DevicesList::new(self.driver, self.api)
    }

    pub fn device_form(&self) -> DeviceForm<'a> {
        DeviceForm::new(self.driver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    FetchDevices,
    CreateAndDeleteDevice,
    RenameFirstDevice,
    DeleteLastDeviceViaApi,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::FetchDevices,
        Scenario::CreateAndDeleteDevice,
        Scenario::RenameFirstDevice,
        Scenario::DeleteLastDeviceViaApi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::FetchDevices => "Fetch Devices",
            Scenario::CreateAndDeleteDevice => "Create and delete a device",
            Scenario::RenameFirstDevice => "Rename first device",
            Scenario::DeleteLastDeviceViaApi => "Delete the last device using API",
        }
    }

    pub fn find(name: &str) -> E2eResult<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| E2eError::ScenarioNotFound(name.to_string()))
    }

    pub async fn run(&self, ctx: ScenarioContext<'_>) -> E2eResult<ScenarioOutcome> {
        match self {
            Scenario::FetchDevices => fetch_devices(ctx).await,
            Scenario::CreateAndDeleteDevice => create_and_delete_device(ctx).await,
            Scenario::RenameFirstDevice => rename_first_device(ctx).await,
            Scenario::DeleteLastDeviceViaApi => delete_last_device_via_api(ctx).await,
        }
    }
}

/// Every device the API knows is listed with the same type and capacity
pub async fn fetch_devices(ctx: ScenarioContext<'_>) -> E2eResult<ScenarioOutcome> {
    let list = ctx.devices_list();
    let devices = list.api_fetch_devices().await?;
    for device in &devices {
        list.verify_device_name_type_and_capacity(&device.fields()).await?;
    }
    Ok(ScenarioOutcome::Completed)
}

pub async fn create_and_delete_device(ctx: ScenarioContext<'_>) -> E2eResult<ScenarioOutcome> {
    let list = ctx.devices_list();
    let device = sample_device();

    list.click_add_device_button().await?;
    ctx.device_form().add_new_device(&device).await?;
    list.verify_device_name_type_and_capacity(&device).await?;

    list.delete_device(&device.system_name).await?;
    list.verify_device_is_deleted(&device.system_name).await?;
    Ok(ScenarioOutcome::Completed)
}

pub async fn rename_first_device(ctx: ScenarioContext<'_>) -> E2eResult<ScenarioOutcome> {
    let list = ctx.devices_list();
    let names = list.get_all_device_names().await?;

    let Some(original_name) = names.first() else {
        info!("No devices to rename");
        return Ok(ScenarioOutcome::NoDevices);
    };

    let original = list
        .api_fetch_device_by_name(original_name)
        .await?
        .ok_or_else(|| E2eError::DeviceNotFound(original_name.clone()))?;
    let renamed = original.renamed(RENAMED_DEVICE_NAME);

    list.api_rename_device(&renamed).await?;

    let verified = async {
        list.refresh_page().await?;
        list.verify_device_name(&renamed.system_name).await
    }
    .await;

    // Restore the original name whether or not the check passed
    let restored = list.api_rename_device(&original).await;
    after_cleanup(verified, restored)
}

pub async fn delete_last_device_via_api(ctx: ScenarioContext<'_>) -> E2eResult<ScenarioOutcome> {
    let list = ctx.devices_list();
    let names = list.get_all_device_names().await?;

    let Some(last_name) = names.last() else {
        info!("No devices to delete");
        return Ok(ScenarioOutcome::NoDevices);
    };

    let last = list
        .api_fetch_device_by_name(last_name)
        .await?
        .ok_or_else(|| E2eError::DeviceNotFound(last_name.clone()))?;

    list.api_delete_device(&last.id).await?;

    let verified = async {
        list.refresh_page().await?;
        list.verify_device_is_deleted(&last.system_name).await
    }
    .await;

    // Put it back; the API assigns a new id
    let restored = list.api_add_new_device(&last.fields()).await;
    after_cleanup(verified, restored)
}

/// Combine a check with the cleanup that followed it. A failed cleanup
/// wins, so the check's failure is logged here rather than lost.
fn after_cleanup(verified: E2eResult<()>, cleanup: E2eResult<()>) -> E2eResult<ScenarioOutcome> {
    match (verified, cleanup) {
        (Ok(()), Ok(())) => Ok(ScenarioOutcome::Completed),
        (Err(check), Ok(())) => Err(check),
        (Ok(()), Err(cleanup)) => Err(cleanup),
        (Err(check), Err(cleanup)) => {
            error!("Check failed before cleanup also failed: {}", check);
            Err(cleanup)
        }
    }
}
