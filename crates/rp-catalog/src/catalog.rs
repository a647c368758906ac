//! Discovered drivers and read-only queries over them

use std::path::{Path, PathBuf};

use rp_ini::ErrorCode;
use serde::Serialize;

use crate::error::CatalogError;
use crate::handle::Handle;
use crate::records::{DeviceInfo, ProtocolDeviceIndex, ProtocolInfo, VendorInfo};

/// One successfully loaded driver
///
/// `protocol_index` runs parallel to `protocols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverEntry {
    name: String,
    library_path: PathBuf,
    vendor: VendorInfo,
    devices: Box<[DeviceInfo]>,
    protocols: Box<[ProtocolInfo]>,
    protocol_index: Box<[ProtocolDeviceIndex]>,
}

impl DriverEntry {
    pub(crate) fn new(
        name: String,
        library_path: PathBuf,
        vendor: VendorInfo,
        devices: Vec<DeviceInfo>,
        protocols: Vec<(ProtocolInfo, ProtocolDeviceIndex)>,
    ) -> Self {
        let (protocols, protocol_index): (Vec<_>, Vec<_>) = protocols.into_iter().unzip();
        Self {
            name,
            library_path,
            vendor,
            devices: devices.into_boxed_slice(),
            protocols: protocols.into_boxed_slice(),
            protocol_index: protocol_index.into_boxed_slice(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the driver's shared library is expected
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    pub fn vendor(&self) -> &VendorInfo {
        &self.vendor
    }

    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    pub fn protocols(&self) -> &[ProtocolInfo] {
        &self.protocols
    }

    pub fn protocol_index(&self) -> &[ProtocolDeviceIndex] {
        &self.protocol_index
    }

    /// Device at `index` in declaration order
    pub fn device(&self, index: usize) -> Result<&DeviceInfo, CatalogError> {
        self.devices.get(index).ok_or_else(|| {
            CatalogError::BadArgument(format!(
                "device index {index} out of range for {} ({} devices)",
                self.name,
                self.devices.len()
            ))
        })
    }

    /// First device whose `DeviceId` parses to `id`
    pub fn device_by_id(&self, id: u32) -> Option<&DeviceInfo> {
        self.devices
            .iter()
            .find(|d| d.numeric_id().is_ok_and(|n| n == id))
    }

    /// The `nth` (zero-based) device named `name`
    pub fn device_by_name(&self, name: &str, nth: usize) -> Option<&DeviceInfo> {
        self.devices
            .iter()
            .filter(|d| d.device_name.as_deref() == Some(name))
            .nth(nth)
    }

    /// Protocol at `index` in declaration order
    pub fn protocol(&self, index: usize) -> Result<&ProtocolInfo, CatalogError> {
        self.protocols.get(index).ok_or_else(|| {
            CatalogError::BadArgument(format!(
                "protocol index {index} out of range for {} ({} protocols)",
                self.name,
                self.protocols.len()
            ))
        })
    }

    /// First protocol whose `ProtocolString` equals `name`
    pub fn protocol_by_name(&self, name: &str) -> Option<&ProtocolInfo> {
        self.protocols
            .iter()
            .find(|p| p.protocol_string.as_deref() == Some(name))
    }

    /// Protocol by its position id in the protocol index
    pub fn protocol_by_id(&self, id: usize) -> Option<&ProtocolInfo> {
        self.protocol_index
            .iter()
            .position(|entry| entry.protocol_id == id)
            .and_then(|i| self.protocols.get(i))
    }

    /// Devices listed by the protocol named `protocol`
    ///
    /// Devices come back in the order the protocol lists their ids. Ids that
    /// match no declared device are skipped, as is an unknown protocol.
    pub fn devices_supporting_protocol(&self, protocol: &str) -> Vec<&DeviceInfo> {
        let Some(position) = self
            .protocols
            .iter()
            .position(|p| p.protocol_string.as_deref() == Some(protocol))
        else {
            return Vec::new();
        };

        self.protocol_index[position]
            .device_ids
            .iter()
            .filter_map(|&id| self.device_by_id(id))
            .collect()
    }

    /// Protocols whose device list names `device`
    pub fn protocols_for_device(&self, device: &DeviceInfo) -> Result<Vec<&ProtocolInfo>, CatalogError> {
        let id = device.numeric_id()?;
        Ok(self
            .protocol_index
            .iter()
            .zip(self.protocols.iter())
            .filter(|(entry, _)| entry.supports(id))
            .map(|(_, protocol)| protocol)
            .collect())
    }
}

/// A driver that could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadError {
    pub name: String,
    pub code: ErrorCode,
    pub description: String,
}

/// Everything found by one discovery run
///
/// Every driver name listed in the registry ends up either in
/// [`drivers`](Self::drivers) or in [`load_errors`](Self::load_errors).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    drivers: Box<[DriverEntry]>,
    load_errors: Box<[LoadError]>,
}

impl Catalog {
    pub(crate) fn new(drivers: Vec<DriverEntry>, load_errors: Vec<LoadError>) -> Self {
        Self {
            drivers: drivers.into_boxed_slice(),
            load_errors: load_errors.into_boxed_slice(),
        }
    }

    pub fn drivers(&self) -> &[DriverEntry] {
        &self.drivers
    }

    pub fn load_errors(&self) -> &[LoadError] {
        &self.load_errors
    }

    /// Handle to the driver at `index`
    pub fn driver(&self, index: usize) -> Result<Handle<&DriverEntry>, CatalogError> {
        self.drivers
            .get(index)
            .map(|entry| Handle::attach(entry, None))
            .ok_or_else(|| {
                CatalogError::BadArgument(format!(
                    "driver index {index} out of range ({} drivers)",
                    self.drivers.len()
                ))
            })
    }

    /// Handle to the driver named exactly `name`
    pub fn driver_by_name(&self, name: &str) -> Option<Handle<&DriverEntry>> {
        self.drivers
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| Handle::attach(entry, None))
    }

    pub fn load_error(&self, index: usize) -> Result<&LoadError, CatalogError> {
        self.load_errors.get(index).ok_or_else(|| {
            CatalogError::BadArgument(format!(
                "load error index {index} out of range ({} errors)",
                self.load_errors.len()
            ))
        })
    }

    /// Every (driver, device) pair able to run `protocol`, driver by driver
    pub fn devices_supporting_protocol(&self, protocol: &str) -> Vec<(&DriverEntry, &DeviceInfo)> {
        self.drivers
            .iter()
            .flat_map(|driver| {
                driver
                    .devices_supporting_protocol(protocol)
                    .into_iter()
                    .map(move |device| (driver, device))
            })
            .collect()
    }
}
