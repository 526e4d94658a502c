#![no_main]

use libfuzzer_sys::fuzz_target;

use checkreport_core::{CheckerFilter, StatusFilter};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let _ = StatusFilter::parse(&s);
    let _ = CheckerFilter::parse(&s);
});
