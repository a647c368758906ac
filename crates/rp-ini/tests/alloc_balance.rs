//! Parsing then dropping a document must hand back every allocation
//!
//! Runs without the libtest harness so no other thread allocates while the
//! counters are being compared.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use rp_ini::{DuplicateMode, IniConfig, IniDocument};

struct CountingAllocator;

static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
static FREED: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATED.fetch_add(1, Ordering::SeqCst);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        FREED.fetch_add(1, Ordering::SeqCst);
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

const DOCUMENTS: &[&str] = &[
    "",
    "[S]\nK=V\n",
    "; comment only\r\n",
    "[RP1210Support]\r\nAPIImplementations=DRV1,DRV2\r\n\r\n[S]\r\nA=1\r\nA=2\r\nEmpty=\r\n",
    "[VendorInformation]\nName=Acme\nDevices=1,2,99\n[DeviceInformation1]\nDeviceID=1\n",
    // Syntax errors must discard the partial tree cleanly too
    "[S]\nK=V\n[Broken\n",
    "K=outside\n",
];

fn outstanding() -> isize {
    ALLOCATED.load(Ordering::SeqCst) as isize - FREED.load(Ordering::SeqCst) as isize
}

fn check(text: &str, config: IniConfig) {
    let before = outstanding();
    {
        let parsed = IniDocument::parse(text.as_bytes(), config);
        if let Ok(doc) = &parsed {
            let _ = doc.sections().count();
        }
    }
    let after = outstanding();
    assert_eq!(
        before, after,
        "allocation imbalance after parsing {text:?} with {config:?}"
    );
}

fn main() {
    // Warm up lazily-initialized statics (tracing callsites) before counting
    for text in DOCUMENTS {
        let _ = IniDocument::parse(text.as_bytes(), IniConfig::default());
    }

    for mode in [DuplicateMode::KeepFirst, DuplicateMode::KeepLast] {
        for text in DOCUMENTS {
            check(text, IniConfig::with_duplicate_mode(mode));
        }
    }
    println!("alloc_balance: ok");
}
