//! Vendor, device and protocol records read from driver documents

use rp_ini::parse_integer;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Contents of a driver's `VendorInformation` section
///
/// Every field is optional. Fields newer than the configured revision are
/// never read and stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    // Revision A
    pub name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal: Option<String>,
    pub telephone: Option<String>,
    pub fax: Option<String>,
    pub vendor_url: Option<String>,
    pub message_string: Option<String>,
    pub error_string: Option<String>,
    pub timestamp_weight: Option<String>,
    /// Comma-separated `DeviceInformation<N>` suffixes
    pub devices: Option<String>,
    /// Comma-separated `ProtocolInformation<N>` suffixes
    pub protocols: Option<String>,

    // Revision B
    pub auto_detect_capable: Option<String>,
    pub version: Option<String>,
    pub rp1210: Option<String>,
    pub debug_level: Option<String>,
    pub debug_file: Option<String>,
    pub debug_mode: Option<String>,
    pub debug_file_size: Option<String>,
    pub number_of_rts_cts_sessions: Option<String>,

    // Revision C
    pub can_formats_supported: Option<String>,
    pub j1939_formats_supported: Option<String>,
    pub j1939_addresses: Option<String>,
    pub can_auto_baud: Option<String>,
    pub j1708_formats_supported: Option<String>,
    pub iso15765_formats_supported: Option<String>,
}

/// Contents of one `DeviceInformation<N>` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub device_description: Option<String>,
    pub device_params: Option<String>,
    pub multi_can_channels: Option<String>,
    pub multi_j1939_channels: Option<String>,
    pub multi_iso15765_channels: Option<String>,
}

impl DeviceInfo {
    /// The `DeviceId` value as a number
    pub fn numeric_id(&self) -> Result<u32, CatalogError> {
        let raw = self
            .device_id
            .as_deref()
            .ok_or_else(|| CatalogError::BadArgument("device has no DeviceId".to_string()))?;
        let id = parse_integer(raw).map_err(|e| CatalogError::BadArgument(e.to_string()))?;
        u32::try_from(id).map_err(|_| CatalogError::BadArgument(format!("negative device id: {id}")))
    }
}

/// Contents of one `ProtocolInformation<N>` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolInfo {
    pub protocol_description: Option<String>,
    pub protocol_speed: Option<String>,
    pub protocol_string: Option<String>,
    pub protocol_params: Option<String>,
    /// Raw comma-separated device id list
    pub devices: Option<String>,
}

/// Device ids usable with one protocol
///
/// `protocol_id` is the protocol's position in its driver's protocol list.
/// The ids were checked to be non-negative integers only; they may name
/// devices the driver never declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDeviceIndex {
    pub protocol_id: usize,
    pub device_ids: Box<[u32]>,
}

impl ProtocolDeviceIndex {
    pub fn supports(&self, device_id: u32) -> bool {
        self.device_ids.contains(&device_id)
    }
}
