//! Devices listing page and the devices API behind it

use tracing::debug;

use super::{expect_eq, expect_ok};
use crate::api::DevicesApi;
use crate::device::{Device, DeviceId, NewDevice};
use crate::driver::{Driver, WaitState};
use crate::error::E2eResult;

const ADD_DEVICE_BUTTON: &str = r#"a[href="/devices/add"]"#;
const DEVICE_ROW: &str = ".device-main-box";
const DEVICE_NAME: &str = ".device-name";
const DEVICE_NAMES: &str = ".device-main-box .device-name";
const DEVICE_REMOVE: &str = ".device-remove";
const DEVICE_EDIT: &str = ".device-edit";
const DEVICE_CAPACITY: &str = ".device-capacity";
const DEVICE_TYPE: &str = ".device-type";

/// Row whose name contains `name`, matched case-sensitively.
///
/// `:has-text()` ignores case, so the name goes through `:text-matches()`
/// as an escaped pattern with no flags.
pub(crate) fn device_row(name: &str) -> String {
    let quoted = name_pattern(name)
        .replace('\\', r"\\")
        .replace('"', r#"\""#);
    format!(
        r#"{}:has({}:text-matches("{}"))"#,
        DEVICE_ROW, DEVICE_NAME, quoted
    )
}

/// Pattern matching `name` literally
fn name_pattern(name: &str) -> String {
    regex::escape(name)
}

/// `child` inside `parent`
fn within(parent: &str, child: &str) -> String {
    format!("{} >> {}", parent, child)
}

/// The devices listing
pub struct DevicesList<'a> {
    driver: &'a dyn Driver,
    api: &'a DevicesApi,
}

impl<'a> DevicesList<'a> {
    pub fn new(driver: &'a dyn Driver, api: &'a DevicesApi) -> Self {
        Self { driver, api }
    }

    // UI

    pub async fn click_add_device_button(&self) -> E2eResult<()> {
        self.driver.click(ADD_DEVICE_BUTTON).await
    }

    /// Check the row's type and capacity text, then its name and controls
    pub async fn verify_device_name_type_and_capacity(&self, device: &NewDevice) -> E2eResult<()> {
        let row = device_row(&device.system_name);

        let shown_type = self.driver.inner_text(&within(&row, DEVICE_TYPE)).await?;
        expect_eq(&shown_type, device.device_type.as_str(), || {
            format!("Type does not match for {}", device.system_name)
        })?;

        let shown_capacity = self.driver.inner_text(&within(&row, DEVICE_CAPACITY)).await?;
        expect_eq(&shown_capacity, &device.capacity_label(), || {
            format!("Capacity does not match for {}", device.system_name)
        })?;

        self.verify_device_name(&device.system_name).await
    }

    /// Check the row is shown with its edit and remove controls
    pub async fn verify_device_name(&self, system_name: &str) -> E2eResult<()> {
        let row = device_row(system_name);

        let visible = self.driver.wait_for(&row, WaitState::Visible).await?;
        expect_ok(visible, || {
            format!("Device with name {} does not exist.", system_name)
        })?;

        let has_edit = self
            .driver
            .wait_for(&within(&row, DEVICE_EDIT), WaitState::Attached)
            .await?;
        expect_ok(has_edit, || {
            format!("Device with name {} does not have an edit button.", system_name)
        })?;

        let has_remove = self
            .driver
            .wait_for(&within(&row, DEVICE_REMOVE), WaitState::Attached)
            .await?;
        expect_ok(has_remove, || {
            format!("Device with name {} does not have a remove button.", system_name)
        })
    }

    /// Names as rendered, top to bottom
    pub async fn get_all_device_names(&self) -> E2eResult<Vec<String>> {
        let names = self.driver.all_inner_texts(DEVICE_NAMES).await?;
        debug!("listed {} device(s)", names.len());
        Ok(names)
    }

    pub async fn delete_device(&self, system_name: &str) -> E2eResult<()> {
        let remove = within(&device_row(system_name), DEVICE_REMOVE);
        self.driver.click(&remove).await
    }

    pub async fn verify_device_is_deleted(&self, system_name: &str) -> E2eResult<()> {
        let gone = self
            .driver
            .wait_for(&device_row(system_name), WaitState::Detached)
            .await?;
        expect_ok(gone, || {
            format!(
                "Device with name {} is still visible after deletion.",
                system_name
            )
        })
    }

    /// Full reload, to pick up changes made behind the UI's back
    pub async fn refresh_page(&self) -> E2eResult<()> {
        self.driver.reload().await
    }

    // API

    pub async fn api_fetch_devices(&self) -> E2eResult<Vec<Device>> {
        self.api.fetch_devices().await
    }

    pub async fn api_fetch_device_by_name(&self, system_name: &str) -> E2eResult<Option<Device>> {
        self.api.fetch_device_by_name(system_name).await
    }

    pub async fn api_rename_device(&self, device: &Device) -> E2eResult<()> {
        self.api.update_device(device).await
    }

    pub async fn api_add_new_device(&self, device: &NewDevice) -> E2eResult<()> {
        self.api.create_device(device).await
    }

    pub async fn api_delete_device(&self, id: &DeviceId) -> E2eResult<()> {
        self.api.delete_device(id).await
    }
}
