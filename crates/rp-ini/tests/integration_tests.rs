//! Integration tests for the INI library
//!
//! These tests drive the public API end to end:
//! - Parsing realistic RP1210 registry and vendor documents
//! - Duplicate resolution under both modes
//! - Error codes surfaced through an explicit error context
//! - Robustness against arbitrary input

use rp_ini::{
    CodedError, DuplicateMode, ErrorCode, ErrorContext, IniConfig, IniDocument, IniError,
    SyntaxErrorKind,
};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub const VENDOR_FILE: &str = "\
;RP1210 vendor file\r
[VendorInformation]\r
Name=Acme Diagnostics\r
Address1=1 Main Street\r
TimestampWeight=1000\r
Devices=1,2\r
Protocols=1\r
\r
[DeviceInformation1]\r
DeviceID=1\r
DeviceName=USB\r
\r
[DeviceInformation2]\r
DeviceID=2\r
DeviceName=Bluetooth\r
\r
[ProtocolInformation1]\r
ProtocolString=J1939\r
ProtocolDescription=SAE J1939 Protocol\r
Devices=1,2\r
";

    pub fn parse(text: &str) -> IniDocument {
        IniDocument::parse(text.as_bytes(), IniConfig::default()).unwrap()
    }

    pub fn parse_err(text: &str) -> IniError {
        IniDocument::parse(text.as_bytes(), IniConfig::default()).unwrap_err()
    }
}

// ============================================================================
// Parsing
// ============================================================================

mod parsing {
    use super::*;

    #[test]
    fn test_vendor_file_round_trip() {
        let doc = helpers::parse(helpers::VENDOR_FILE);

        assert_eq!(
            doc.read_key("VendorInformation", "Name").unwrap(),
            "Acme Diagnostics"
        );
        assert_eq!(doc.read_int("VendorInformation", "TimestampWeight").unwrap(), 1000);
        assert_eq!(doc.read_key("DeviceInformation2", "DeviceName").unwrap(), "Bluetooth");
        assert_eq!(doc.read_key("protocolinformation1", "protocolstring").unwrap(), "J1939");
    }

    #[test]
    fn test_section_listing() {
        let doc = helpers::parse(helpers::VENDOR_FILE);
        let sections: Vec<_> = doc.sections().collect();
        assert_eq!(
            sections,
            vec![
                "VendorInformation",
                "DeviceInformation1",
                "DeviceInformation2",
                "ProtocolInformation1",
            ]
        );
    }

    #[test]
    fn test_minimal_round_trip() {
        let doc = helpers::parse("[S]\nK=V\n");
        assert!(doc.has_section("S"));
        assert!(doc.has_key("S", "K"));
        assert_eq!(doc.read_key_length("S", "K").unwrap(), 1);

        let mut buf = [0u8; 2];
        assert_eq!(doc.read_key_into("S", "K", &mut buf).unwrap(), 1);
        assert_eq!(&buf, b"V\0");
    }

    #[test]
    fn test_unterminated_section_reports_line() {
        let err = helpers::parse_err("[S");
        assert_eq!(err.line(), Some(1));
        assert_eq!(err.code(), ErrorCode::InvalidSection);
        assert!(matches!(
            err,
            IniError::Syntax {
                kind: SyntaxErrorKind::InvalidSection,
                ..
            }
        ));
    }

    #[test]
    fn test_error_line_counts_every_break_style() {
        let err = helpers::parse_err("[A]\rK=1\r\nL=2\n\n=oops\n");
        assert_eq!(err.line(), Some(5));
        assert_eq!(err.code(), ErrorCode::InvalidKeyName);
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rp121032.ini");
        std::fs::write(&path, "[RP1210Support]\nAPIImplementations=A,B\n").unwrap();

        let doc = IniDocument::open(&path, IniConfig::default()).unwrap();
        assert_eq!(
            doc.read_key("RP1210Support", "APIImplementations").unwrap(),
            "A,B"
        );

        let err = IniDocument::open(dir.path().join("missing.ini"), IniConfig::default())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::FileNotFound);
    }

    #[test]
    fn test_open_directory_is_an_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = IniDocument::open(dir.path(), IniConfig::default()).unwrap_err();
        assert!(matches!(
            err.code(),
            ErrorCode::FileIo | ErrorCode::SystemError
        ));
    }
}

// ============================================================================
// Duplicate Resolution
// ============================================================================

mod duplicates {
    use super::*;

    const OVERRIDES: &str = "\
[Settings]
Port=1
Baud=9600
[Other]
X=1
[settings]
Port=2
";

    #[test]
    fn test_keep_first_ignores_later_section() {
        let doc = IniDocument::parse(
            OVERRIDES.as_bytes(),
            IniConfig::with_duplicate_mode(DuplicateMode::KeepFirst),
        )
        .unwrap();
        assert_eq!(doc.read_key("Settings", "Port").unwrap(), "1");
        assert_eq!(doc.read_key("Settings", "Baud").unwrap(), "9600");
    }

    #[test]
    fn test_keep_last_resolves_whole_section() {
        let doc = IniDocument::parse(
            OVERRIDES.as_bytes(),
            IniConfig::with_duplicate_mode(DuplicateMode::KeepLast),
        )
        .unwrap();
        assert_eq!(doc.read_key("Settings", "Port").unwrap(), "2");
        // Sections are not merged: Baud lives only in the earlier one
        assert!(!doc.has_key("Settings", "Baud"));
    }

    #[test]
    fn test_enumeration_dedup_keep_first() {
        let doc = helpers::parse("[S]\nA=1\nB=2\nA=3\nC=4\nB=5\n");
        let keys: Vec<_> = doc
            .keys("S")
            .unwrap()
            .map(|entry| entry.unwrap().0)
            .collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }
}

// ============================================================================
// Error Context
// ============================================================================

mod error_context {
    use super::*;

    #[test]
    fn test_context_tracks_most_recent_call() {
        let doc = helpers::parse("[S]\nGood=42\nBad=12x\nBig=2147483648\n");
        let mut ctx = ErrorContext::new();

        assert_eq!(ctx.capture(doc.read_int("S", "Good")), Some(42));
        assert!(!ctx.is_error());

        assert_eq!(ctx.capture(doc.read_int("S", "Bad")), None);
        assert_eq!(ctx.code(), ErrorCode::BadArgument);

        assert_eq!(ctx.capture(doc.read_int("S", "Big")), None);
        assert_eq!(ctx.code(), ErrorCode::ValueOutOfRange);

        assert_eq!(ctx.capture(doc.read_key("T", "K")), None);
        assert_eq!(ctx.code(), ErrorCode::SectionNotFound);
        assert_eq!(ctx.description(), "section not found: [T]");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_]{0,11}"
    }

    fn value() -> impl Strategy<Value = String> {
        "[A-Za-z0-9,.=;_-]{0,16}"
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
            if let Ok(doc) = IniDocument::parse(&data, IniConfig::default()) {
                for section in doc.sections() {
                    prop_assert!(doc.has_section(section));
                }
            }
        }

        #[test]
        fn syntax_errors_carry_a_line(data in prop::collection::vec(any::<u8>(), 0..256)) {
            if let Err(err) = IniDocument::parse(&data, IniConfig::default()) {
                let line = err.line();
                prop_assert!(line.is_some());
                prop_assert!(line.unwrap() >= 1);
            }
        }

        #[test]
        fn written_pairs_read_back(
            pairs in prop::collection::vec((name(), value()), 1..12)
        ) {
            let mut text = String::from("[Section]\n");
            for (k, v) in &pairs {
                text.push_str(&format!("{k}={v}\n"));
            }

            let first = IniDocument::parse(
                text.as_bytes(),
                IniConfig::with_duplicate_mode(DuplicateMode::KeepFirst),
            ).unwrap();
            let last = IniDocument::parse(
                text.as_bytes(),
                IniConfig::with_duplicate_mode(DuplicateMode::KeepLast),
            ).unwrap();

            for (k, _) in &pairs {
                let earliest = pairs.iter().find(|(n, _)| n.eq_ignore_ascii_case(k)).unwrap();
                let latest = pairs.iter().rev().find(|(n, _)| n.eq_ignore_ascii_case(k)).unwrap();
                prop_assert_eq!(first.read_key("Section", k).unwrap(), earliest.1.as_str());
                prop_assert_eq!(last.read_key("Section", k).unwrap(), latest.1.as_str());
            }
        }

        #[test]
        fn read_int_matches_std(n in any::<i32>()) {
            let doc = IniDocument::parse(format!("[S]\nN={n}\n").as_bytes(), IniConfig::default())
                .unwrap();
            prop_assert_eq!(doc.read_int("S", "N").unwrap(), n);
        }
    }
}
