//! Driver discovery
//!
//! Reads the registry document, then every driver document it lists, and
//! collects the results into a [`Catalog`]. Only a registry failure stops
//! discovery; a bad driver document becomes a [`LoadError`] and the next
//! driver is tried.

use rp_ini::{parse_integer, ErrorContext, IniConfig, IniDocument, IniError};
use tracing::{debug, info, trace, warn};

use crate::catalog::{Catalog, DriverEntry, LoadError};
use crate::config::{DiscoveryConfig, Rp1210Revision};
use crate::error::CatalogError;
use crate::handle::{Handle, ReleaseFn};
use crate::platform::{PathProvider, RegistryLayout};
use crate::records::{DeviceInfo, ProtocolDeviceIndex, ProtocolInfo, VendorInfo};

const SUPPORT_SECTION: &str = "RP1210Support";
const IMPLEMENTATIONS_KEY: &str = "APIImplementations";
const VENDOR_SECTION: &str = "VendorInformation";
const DEVICE_PREFIX: &str = "DeviceInformation";
const PROTOCOL_PREFIX: &str = "ProtocolInformation";
const LIST_DELIMITER: char = ',';

/// Builds catalogs from the files a [`PathProvider`] points at
#[derive(Debug, Clone)]
pub struct CatalogBuilder<P = RegistryLayout> {
    paths: P,
    ini: IniConfig,
    revision: Rp1210Revision,
}

impl CatalogBuilder<RegistryLayout> {
    /// Builder using the platform default layout
    pub fn new() -> Self {
        Self::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        Self {
            paths: config.layout,
            ini: config.ini,
            revision: config.revision,
        }
    }
}

impl Default for CatalogBuilder<RegistryLayout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PathProvider> CatalogBuilder<P> {
    /// Builder over a custom path provider
    pub fn with_paths(paths: P, ini: IniConfig, revision: Rp1210Revision) -> Self {
        Self {
            paths,
            ini,
            revision,
        }
    }

    /// Discover every driver listed in the registry
    pub fn discover(&self) -> Result<Handle<Catalog>, CatalogError> {
        self.discover_with_context(&mut ErrorContext::new())
    }

    /// Discover drivers, recording failures into `ctx`
    ///
    /// A registry failure is recorded and returned. Per-driver failures are
    /// recorded as they happen, so after a successful run `ctx` holds the
    /// last driver failure, or no error when every driver loaded.
    pub fn discover_with_context(
        &self,
        ctx: &mut ErrorContext,
    ) -> Result<Handle<Catalog>, CatalogError> {
        ctx.clear();

        let list = self.read_registry().inspect_err(|e| {
            ctx.record(e);
            warn!("Registry unavailable: {}", e);
        })?;

        let capacity = if list.is_empty() {
            0
        } else {
            list.matches(LIST_DELIMITER).count() + 1
        };
        let mut drivers = Vec::with_capacity(capacity);
        let mut load_errors = Vec::with_capacity(capacity);

        for name in split_list(&list) {
            match self.load_driver(name) {
                Ok(entry) => {
                    debug!(
                        "Loaded driver {} ({} devices, {} protocols)",
                        name,
                        entry.devices().len(),
                        entry.protocols().len()
                    );
                    drivers.push(entry);
                }
                Err(e) => {
                    ctx.record(&e);
                    warn!("Failed to load driver {}: {}", name, e);
                    load_errors.push(LoadError {
                        name: name.to_string(),
                        code: ctx.code(),
                        description: ctx.description().to_string(),
                    });
                }
            }
        }

        info!(
            "Found {} driver(s), {} failed to load",
            drivers.len(),
            load_errors.len()
        );

        let release: ReleaseFn<Catalog> = Box::new(|catalog: Catalog| {
            trace!("Releasing catalog of {} driver(s)", catalog.drivers().len());
        });
        Ok(Handle::attach(Catalog::new(drivers, load_errors), Some(release)))
    }

    fn read_registry(&self) -> Result<String, CatalogError> {
        let path = self.paths.registry_path()?;
        debug!("Reading registry {}", path.display());
        let doc = IniDocument::open(&path, self.ini)?;
        Ok(doc.read_key(SUPPORT_SECTION, IMPLEMENTATIONS_KEY)?.to_string())
    }

    fn load_driver(&self, name: &str) -> Result<DriverEntry, CatalogError> {
        let document_path = self.paths.driver_document_path(name)?;
        let library_path = self.paths.library_path(name)?;
        let doc = IniDocument::open(&document_path, self.ini)?;

        let vendor = read_vendor(&doc, self.revision)?;
        let devices = read_devices(&doc, vendor.devices.as_deref())?;
        let protocols = read_protocols(&doc, vendor.protocols.as_deref(), devices.len())?;

        Ok(DriverEntry::new(
            name.to_string(),
            library_path,
            vendor,
            devices,
            protocols,
        ))
    }
}

/// Non-empty, space-trimmed tokens of a comma-separated list
fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(LIST_DELIMITER)
        .map(|token| token.trim_matches(' '))
        .filter(|token| !token.is_empty())
}

/// Non-negative integers of a comma-separated list, skipping anything else
fn list_ids(list: &str) -> impl Iterator<Item = u32> + '_ {
    split_list(list).filter_map(|token| {
        let id = parse_integer(token).ok().and_then(|n| u32::try_from(n).ok());
        if id.is_none() {
            trace!("Skipping list entry {:?}", token);
        }
        id
    })
}

/// Names of the `<prefix><N>` sections that exist in `doc`, in list order
fn listed_sections<'a>(
    doc: &'a IniDocument,
    list: Option<&'a str>,
    prefix: &'a str,
) -> impl Iterator<Item = String> + 'a {
    list.into_iter()
        .flat_map(list_ids)
        .map(move |id| format!("{prefix}{id}"))
        .filter(move |section| doc.has_section(section))
}

/// Value of `key`, or `None` when the section or key is absent
fn read_optional(doc: &IniDocument, section: &str, key: &str) -> Result<Option<String>, IniError> {
    match doc.read_key(section, key) {
        Ok(value) => Ok(Some(value.to_string())),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn read_vendor(doc: &IniDocument, revision: Rp1210Revision) -> Result<VendorInfo, IniError> {
    let read = |key: &str| read_optional(doc, VENDOR_SECTION, key);
    let since = |min: Rp1210Revision, key: &str| {
        if revision >= min {
            read(key)
        } else {
            Ok(None)
        }
    };

    use Rp1210Revision::{B, C};
    Ok(VendorInfo {
        name: read("Name")?,
        address1: read("Address1")?,
        address2: read("Address2")?,
        city: read("City")?,
        state: read("State")?,
        country: read("Country")?,
        postal: read("Postal")?,
        telephone: read("Telephone")?,
        fax: read("Fax")?,
        vendor_url: read("VendorURL")?,
        message_string: read("MessageString")?,
        error_string: read("ErrorString")?,
        timestamp_weight: read("TimestampWeight")?,
        devices: read("Devices")?,
        protocols: read("Protocols")?,

        auto_detect_capable: since(B, "AutoDetectCapable")?,
        version: since(B, "Version")?,
        rp1210: since(B, "RP1210")?,
        debug_level: since(B, "DebugLevel")?,
        debug_file: since(B, "DebugFile")?,
        debug_mode: since(B, "DebugMode")?,
        debug_file_size: since(B, "DebugFileSize")?,
        number_of_rts_cts_sessions: since(B, "NumberOfRTSCTSSessions")?,

        can_formats_supported: since(C, "CANFormatsSupported")?,
        j1939_formats_supported: since(C, "J1939FormatsSupported")?,
        j1939_addresses: since(C, "J1939Addresses")?,
        can_auto_baud: since(C, "CANAutoBaud")?,
        j1708_formats_supported: since(C, "J1708FormatsSupported")?,
        iso15765_formats_supported: since(C, "ISO15765FormatsSupported")?,
    })
}

fn read_devices(doc: &IniDocument, list: Option<&str>) -> Result<Vec<DeviceInfo>, IniError> {
    listed_sections(doc, list, DEVICE_PREFIX)
        .map(|section| -> Result<DeviceInfo, IniError> {
            let read = |key: &str| read_optional(doc, &section, key);
            Ok(DeviceInfo {
                device_id: read("DeviceId")?,
                device_name: read("DeviceName")?,
                device_description: read("DeviceDescription")?,
                device_params: read("DeviceParams")?,
                multi_can_channels: read("MultiCANChannels")?,
                multi_j1939_channels: read("MultiJ1939Channels")?,
                multi_iso15765_channels: read("MultiISO15765Channels")?,
            })
        })
        .collect()
}

fn read_protocols(
    doc: &IniDocument,
    list: Option<&str>,
    device_count: usize,
) -> Result<Vec<(ProtocolInfo, ProtocolDeviceIndex)>, IniError> {
    listed_sections(doc, list, PROTOCOL_PREFIX)
        .enumerate()
        .map(|(protocol_id, section)| -> Result<_, IniError> {
            let read = |key: &str| read_optional(doc, &section, key);
            let info = ProtocolInfo {
                protocol_description: read("ProtocolDescription")?,
                protocol_speed: read("ProtocolSpeed")?,
                protocol_string: read("ProtocolString")?,
                protocol_params: read("ProtocolParams")?,
                devices: read("Devices")?,
            };

            let device_ids: Box<[u32]> = info
                .devices
                .as_deref()
                .into_iter()
                .flat_map(list_ids)
                .take(device_count)
                .collect();

            let index = ProtocolDeviceIndex {
                protocol_id,
                device_ids,
            };
            Ok((info, index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_ini::{CodedError, ErrorCode};

    fn parse(text: &str) -> IniDocument {
        IniDocument::parse(text.as_bytes(), IniConfig::default()).unwrap()
    }

    #[test]
    fn test_split_list() {
        let names: Vec<_> = split_list(" drvA, ,drvB,,").collect();
        assert_eq!(names, vec!["drvA", "drvB"]);
        assert_eq!(split_list("").count(), 0);
    }

    #[test]
    fn test_list_ids_skips_invalid_tokens() {
        let ids: Vec<_> = list_ids("1, 2,x,-4,0x10,3y").collect();
        assert_eq!(ids, vec![1, 2, 16]);
    }

    #[test]
    fn test_vendor_fields_follow_revision() {
        let doc = parse(
            "[VendorInformation]\nName=Acme\nVersion=2.0\nCANAutoBaud=TRUE\nVendorURL=acme.example\n",
        );

        let a = read_vendor(&doc, Rp1210Revision::A).unwrap();
        assert_eq!(a.name.as_deref(), Some("Acme"));
        assert_eq!(a.vendor_url.as_deref(), Some("acme.example"));
        assert_eq!(a.version, None);
        assert_eq!(a.can_auto_baud, None);

        let b = read_vendor(&doc, Rp1210Revision::B).unwrap();
        assert_eq!(b.version.as_deref(), Some("2.0"));
        assert_eq!(b.can_auto_baud, None);

        let c = read_vendor(&doc, Rp1210Revision::C).unwrap();
        assert_eq!(c.can_auto_baud.as_deref(), Some("TRUE"));
        assert_eq!(c.address2, None);
    }

    #[test]
    fn test_missing_vendor_section_is_empty() {
        let doc = parse("[Other]\nK=V\n");
        let vendor = read_vendor(&doc, Rp1210Revision::C).unwrap();
        assert_eq!(vendor, VendorInfo::default());
        assert!(read_devices(&doc, vendor.devices.as_deref()).unwrap().is_empty());
    }

    #[test]
    fn test_devices_skip_missing_sections() {
        let doc = parse(
            "[DeviceInformation1]\nDeviceID=1\nDeviceName=USB\n\
             [DeviceInformation2]\nDeviceID=2\nDeviceName=BT\n",
        );
        let devices = read_devices(&doc, Some("1,2,99")).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].device_id.as_deref(), Some("1"));
        assert_eq!(devices[1].device_name.as_deref(), Some("BT"));
    }

    #[test]
    fn test_protocol_device_index_is_bounded() {
        let doc = parse(
            "[ProtocolInformation1]\nProtocolString=J1939\nDevices=5,bad,1,2,3\n\
             [ProtocolInformation3]\nProtocolString=CAN\n",
        );
        let protocols = read_protocols(&doc, Some("1,2,3"), 2).unwrap();
        assert_eq!(protocols.len(), 2);

        let (info, index) = &protocols[0];
        assert_eq!(info.protocol_string.as_deref(), Some("J1939"));
        assert_eq!(index.protocol_id, 0);
        assert_eq!(&*index.device_ids, &[5, 1]);

        let (info, index) = &protocols[1];
        assert_eq!(info.protocol_string.as_deref(), Some("CAN"));
        assert_eq!(index.protocol_id, 1);
        assert!(index.device_ids.is_empty());
    }

    #[test]
    fn test_read_optional_propagates_tree_errors() {
        let err = IniError::MissingKeyValue {
            section: "S".into(),
            key: "K".into(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.code(), ErrorCode::MissingKeyValue);

        let doc = parse("[S]\nK=\n");
        assert_eq!(read_optional(&doc, "S", "K").unwrap().as_deref(), Some(""));
        assert_eq!(read_optional(&doc, "S", "Other").unwrap(), None);
        assert_eq!(read_optional(&doc, "T", "K").unwrap(), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn token() -> impl Strategy<Value = String> {
            prop_oneof![
                (0u32..8).prop_map(|n| n.to_string()),
                Just("x".to_string()),
                Just("-1".to_string()),
                Just(String::new()),
            ]
        }

        proptest! {
            #[test]
            fn protocol_index_never_exceeds_device_count(
                tokens in prop::collection::vec(token(), 0..16),
                device_count in 0usize..5,
            ) {
                let text = format!(
                    "[ProtocolInformation1]\nProtocolString=J1939\nDevices={}\n",
                    tokens.join(",")
                );
                let doc = parse(&text);
                let protocols = read_protocols(&doc, Some("1"), device_count).unwrap();
                prop_assert_eq!(protocols.len(), 1);
                prop_assert!(protocols[0].1.device_ids.len() <= device_count);
            }

            #[test]
            fn devices_match_existing_sections(ids in prop::collection::vec(0u32..6, 0..10)) {
                let doc = parse("[DeviceInformation1]\nDeviceID=1\n[DeviceInformation3]\nDeviceID=3\n");
                let list = ids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
                let devices = read_devices(&doc, Some(list.as_str())).unwrap();
                let expected = ids.iter().filter(|&&id| id == 1 || id == 3).count();
                prop_assert_eq!(devices.len(), expected);
            }
        }
    }
}
