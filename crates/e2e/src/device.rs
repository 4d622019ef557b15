//! Device records exchanged between the UI and the devices API

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{E2eError, E2eResult};

/// Unit label the UI appends to a device's capacity
pub const CAPACITY_UNIT: &str = "GB";

/// The closed set of device types the app accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    WindowsWorkstation,
    WindowsServer,
    Mac,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [
        DeviceType::WindowsWorkstation,
        DeviceType::WindowsServer,
        DeviceType::Mac,
    ];

    /// Wire value, also the value of the matching `<option>` in the form
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::WindowsWorkstation => "WINDOWS_WORKSTATION",
            DeviceType::WindowsServer => "WINDOWS_SERVER",
            DeviceType::Mac => "MAC",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| E2eError::UnsupportedDeviceType(s.to_string()))
    }
}

impl TryFrom<String> for DeviceType {
    type Error = E2eError;

    fn try_from(value: String) -> E2eResult<Self> {
        value.parse()
    }
}

impl From<DeviceType> for String {
    fn from(value: DeviceType) -> Self {
        value.as_str().to_string()
    }
}

/// Identifier assigned by the API when a device is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(#[serde(deserialize_with = "string_or_number")] String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A device as stored by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub system_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub hdd_capacity: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

impl Device {
    /// Same device under another name
    pub fn renamed(&self, system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            ..self.clone()
        }
    }

    pub fn fields(&self) -> NewDevice {
        NewDevice {
            system_name: self.system_name.clone(),
            hdd_capacity: self.hdd_capacity.clone(),
            device_type: self.device_type,
        }
    }
}

/// Mutable fields of a device, as submitted on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub system_name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub hdd_capacity: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

impl NewDevice {
    pub fn new(
        system_name: impl Into<String>,
        hdd_capacity: impl Into<String>,
        device_type: DeviceType,
    ) -> Self {
        Self {
            system_name: system_name.into(),
            hdd_capacity: hdd_capacity.into(),
            device_type,
        }
    }

    /// Build from untyped input, rejecting unknown device types
    pub fn parse(system_name: &str, hdd_capacity: &str, device_type: &str) -> E2eResult<Self> {
        Ok(Self::new(system_name, hdd_capacity, device_type.parse()?))
    }

    /// Capacity as the UI renders it, e.g. `512 GB`
    pub fn capacity_label(&self) -> String {
        format!("{} {}", self.hdd_capacity, CAPACITY_UNIT)
    }
}

impl From<&Device> for NewDevice {
    fn from(device: &Device) -> Self {
        device.fields()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
