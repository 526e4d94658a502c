//! Fuzz target for config file parsing.
//!
//! Whatever a parsed config carries must be accepted or rejected by the
//! verbosity and filter parsers without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use checkreport_core::{CheckerFilter, StatusFilter, Verbosity};
use checkreport_types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = toml::from_str::<ConfigFile>(text) else {
        return;
    };

    let defaults = config.defaults;
    if let Some(level) = defaults.verbosity {
        let _ = Verbosity::new(level);
    }
    if let Some(expression) = defaults.status_filter.as_deref() {
        let _ = StatusFilter::parse(expression);
    }
    if let Some(expression) = defaults.analyses_filter.as_deref() {
        let _ = CheckerFilter::parse(expression);
    }
});
