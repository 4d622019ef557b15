//! Device creation form

use tracing::debug;

use crate::device::NewDevice;
use crate::driver::Driver;
use crate::error::E2eResult;

const SYSTEM_NAME_INPUT: &str = "#system_name";
const HDD_CAPACITY_INPUT: &str = "#hdd_capacity";
const TYPE_SELECTOR: &str = "#type";
const SUBMIT_BUTTON: &str = ".submitButton";

/// The add-device form
pub struct DeviceForm<'a> {
    driver: &'a dyn Driver,
}

impl<'a> DeviceForm<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    /// Fill in and submit the form.
    ///
    /// `DeviceType` only holds supported types; untyped input has to go
    /// through [`NewDevice::parse`] first, which rejects anything else
    /// before the page is touched.
    pub async fn add_new_device(&self, device: &NewDevice) -> E2eResult<()> {
        debug!(system_name = %device.system_name, "submitting device form");

        self.driver.fill(SYSTEM_NAME_INPUT, &device.system_name).await?;
        self.driver.fill(HDD_CAPACITY_INPUT, &device.hdd_capacity).await?;

        self.driver.click(TYPE_SELECTOR).await?;
        self.driver
            .select_option(TYPE_SELECTOR, device.device_type.as_str())
            .await?;

        self.driver.click(SUBMIT_BUTTON).await
    }
}
