//! Page objects
//!
//! Each page object is the one place that knows the locators of its page
//! region. They hold no state of their own beyond borrowed handles to the
//! driver (and, for the listing, the devices API).

mod device_form;
mod devices_list;

pub use device_form::DeviceForm;
pub use devices_list::DevicesList;

use crate::error::{E2eError, E2eResult};

fn expect_eq(actual: &str, expected: &str, message: impl FnOnce() -> String) -> E2eResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "{}: expected '{}', got '{}'",
            message(),
            expected,
            actual
        )))
    }
}

fn expect_ok(condition: bool, message: impl FnOnce() -> String) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message()))
    }
}
