//! Text and JSON rendering of catalog queries

use std::fmt::Write;

use anyhow::{bail, Result};
use rp_catalog::{Catalog, DeviceInfo, DriverEntry};
use serde::Serialize;
use tracing::warn;

const UNKNOWN: &str = "-";

/// One device row of the `devices` and `protocol` views
#[derive(Debug, Serialize)]
struct DeviceRow<'a> {
    driver: &'a str,
    device_id: Option<&'a str>,
    device_name: Option<&'a str>,
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    protocols: Option<Vec<&'a str>>,
}

impl<'a> DeviceRow<'a> {
    fn new(driver: &'a DriverEntry, device: &'a DeviceInfo) -> Self {
        Self {
            driver: driver.name(),
            device_id: device.device_id.as_deref(),
            device_name: device.device_name.as_deref(),
            description: device.device_description.as_deref(),
            protocols: None,
        }
    }

    fn with_protocols(mut self, driver: &'a DriverEntry, device: &'a DeviceInfo) -> Self {
        let protocols = match driver.protocols_for_device(device) {
            Ok(protocols) => protocols
                .into_iter()
                .filter_map(|p| p.protocol_string.as_deref())
                .collect(),
            Err(e) => {
                warn!("{}: cannot match protocols for device: {}", driver.name(), e);
                Vec::new()
            }
        };
        self.protocols = Some(protocols);
        self
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Drivers with vendor summary, then load failures
pub fn render_drivers(catalog: &Catalog, json: bool) -> Result<String> {
    if json {
        return to_json(catalog);
    }

    let mut out = String::new();
    if catalog.drivers().is_empty() {
        out.push_str("No RP1210 drivers installed\n");
    }
    for driver in catalog.drivers() {
        let vendor = driver.vendor();
        writeln!(
            out,
            "{:<12} {:<32} {} device(s), {} protocol(s)",
            driver.name(),
            vendor.name.as_deref().unwrap_or(UNKNOWN),
            driver.devices().len(),
            driver.protocols().len()
        )?;
        writeln!(out, "{:<12} library: {}", "", driver.library_path().display())?;
    }

    if !catalog.load_errors().is_empty() {
        out.push_str("\nFailed to load:\n");
        for failure in catalog.load_errors() {
            writeln!(
                out,
                "{:<12} [{}] {}",
                failure.name,
                failure.code.as_i32(),
                failure.description
            )?;
        }
    }

    Ok(out.trim_end().to_string())
}

/// Devices of every driver (or one driver) with their protocols
pub fn render_devices(catalog: &Catalog, driver: Option<&str>, json: bool) -> Result<String> {
    let drivers: Vec<&DriverEntry> = match driver {
        Some(name) => match catalog.driver_by_name(name) {
            Some(handle) => vec![handle.into_inner()],
            None => bail!("no driver named {name}"),
        },
        None => catalog.drivers().iter().collect(),
    };

    let rows: Vec<DeviceRow> = drivers
        .into_iter()
        .flat_map(|driver| {
            driver
                .devices()
                .iter()
                .map(move |device| DeviceRow::new(driver, device).with_protocols(driver, device))
        })
        .collect();

    if json {
        return to_json(&rows);
    }
    Ok(render_rows(&rows))
}

/// Every device, across drivers, that supports `protocol`
pub fn render_protocol(catalog: &Catalog, protocol: &str, json: bool) -> Result<String> {
    let rows: Vec<DeviceRow> = catalog
        .devices_supporting_protocol(protocol)
        .into_iter()
        .map(|(driver, device)| DeviceRow::new(driver, device))
        .collect();

    if json {
        return to_json(&rows);
    }
    if rows.is_empty() {
        return Ok(format!("No device supports {protocol}"));
    }
    Ok(render_rows(&rows))
}

fn render_rows(rows: &[DeviceRow]) -> String {
    let mut out = String::new();
    for row in rows {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "{:<12} {:>4}  {:<24} {}",
            row.driver,
            row.device_id.unwrap_or(UNKNOWN),
            row.device_name.unwrap_or(UNKNOWN),
            row.description.unwrap_or("")
        );
        if let Some(protocols) = &row.protocols {
            let _ = write!(out, " [{}]", protocols.join(", "));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}
