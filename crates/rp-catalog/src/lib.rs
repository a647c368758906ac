//! RP1210 Driver Catalog
//!
//! This crate discovers the RP1210 vendor drivers installed on a machine and
//! exposes their vendor, device and protocol descriptions as a read-only
//! [`Catalog`].
//!
//! Discovery reads the registry document (`rp121032.ini`), then one
//! configuration document per driver it lists. A driver whose document is
//! missing or malformed is reported as a [`LoadError`] without stopping the
//! others.
//!
//! # Example
//!
//! ```rust,no_run
//! use rp_catalog::CatalogBuilder;
//!
//! let catalog = CatalogBuilder::new().discover().unwrap();
//!
//! for driver in catalog.drivers() {
//!     println!("{}: {} device(s)", driver.name(), driver.devices().len());
//! }
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handle;
pub mod platform;
pub mod records;

pub use builder::CatalogBuilder;
pub use catalog::{Catalog, DriverEntry, LoadError};
pub use config::{DiscoveryConfig, Rp1210Revision};
pub use error::CatalogError;
pub use handle::{Handle, HandleKind, ReleaseFn};
pub use platform::{PathProvider, RegistryLayout, RP1210_HOME_ENV};
pub use records::{DeviceInfo, ProtocolDeviceIndex, ProtocolInfo, VendorInfo};
