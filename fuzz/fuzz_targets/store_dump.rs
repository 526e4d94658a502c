//! Fuzz target for store loading, aggregation and the machine-readable
//! renderers.
//!
//! Any JSON that decodes as a store dump must either be rejected with a
//! `ReportError` or render without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;

use checkreport_core::{
    build_report, render_report, summarize, MemoryStore, PathFormatter, RenderContext,
    RenderOptions, ReportPlan, SourceCache,
};
use checkreport_types::{ReportFormat, StoreDump};

fuzz_target!(|data: &[u8]| {
    let Ok(dump) = serde_json::from_slice::<StoreDump>(data) else {
        return;
    };
    let Ok(store) = MemoryStore::from_dump(dump, "fuzz.json") else {
        return;
    };

    let _ = summarize(&store);
    let Ok(report) = build_report(&store, &ReportPlan::default()) else {
        return;
    };

    // Text output reads source files, so only the formats that stay in memory.
    let ctx = RenderContext::new(
        RenderOptions::default(),
        PathFormatter::verbatim(),
        SourceCache::new(),
    );
    for format in [
        ReportFormat::Json,
        ReportFormat::Sarif,
        ReportFormat::Csv,
        ReportFormat::Junit,
    ] {
        let _ = render_report(format, &report, &ctx);
    }
});
