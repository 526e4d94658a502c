//! JUnit XML output renderer.
//!
//! Reports the whole run as one `<testsuite>` for CI systems that understand
//! JUnit results.

use checkreport_types::Status;

use crate::error::ReportError;
use crate::message::generate_message;
use crate::render::{or_unknown, single_line, RenderContext};
use crate::report::Report;
use crate::summary::summarize;
use crate::timing::analyzer_time;

/// Name and classname of the suite.
pub const TESTSUITE_NAME: &str = ".checkreport-analysis-results";

/// Renders a Report as a JUnit XML document.
///
/// The structure is:
/// - `<testsuite>` - one per run; `tests` and `failures` come from the
///   store-wide summary, `time` from the analyzer's own timing record
/// - `<testcase>` - one per error or warning entry
/// - `<failure>` - exactly one per testcase
pub fn render_junit(report: &Report<'_>, ctx: &RenderContext) -> Result<String, ReportError> {
    let store = report.store();
    let summary = summarize(store)?;
    let elapsed = analyzer_time(store.timing_records());

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuite name=\"{TESTSUITE_NAME}\" tests=\"{}\" errors=\"0\" failures=\"{}\" time=\"{elapsed:.3}\" skipped=\"0\">\n",
        summary.total(),
        summary.error + summary.warning,
    ));

    for entry in report.ordered()? {
        if !matches!(entry.status, Status::Error | Status::Warning) {
            continue;
        }
        let statement = store.statement(entry.statement_id)?;
        let path = ctx
            .statement_path(store, statement)?
            .unwrap_or_else(|| "?".to_string());
        let name = format!(
            "{}: {} ({path}:{})",
            entry.status.as_str(),
            entry.kind.short_name(),
            or_unknown(statement.line)
        );
        let message = generate_message(store, entry, ctx.options.verbosity)?;

        out.push_str(&format!(
            "  <testcase name=\"{}\" classname=\"{TESTSUITE_NAME}\">\n",
            escape_xml(&name)
        ));
        out.push_str(&format!(
            "    <failure message=\"{}\"/>\n",
            escape_xml(&single_line(&message))
        ));
        out.push_str("  </testcase>\n");
    }

    out.push_str("</testsuite>\n");
    Ok(out)
}

/// Escapes special XML characters in a string.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_report, ReportPlan};
    use crate::store::MemoryStore;
    use checkreport_testkit::StoreBuilder;
    use checkreport_types::{CheckKind, ValueKind, ANALYZER_PASS};

    fn create_test_store() -> MemoryStore {
        let dump = StoreBuilder::new()
            .file(1, "src/main.c")
            .function(1, "main", Some(1))
            .statement(1, 1, Some(1), 4, 10)
            .statement(2, 1, Some(1), 5, 3)
            .statement(3, 1, Some(1), 6, 3)
            .synthetic_statement(4, 1)
            .operand(1, ValueKind::LocalVariable, "p")
            .root_context(1, 1)
            .check(1, 1, CheckKind::NullPointerDereference, Status::Error)
            .operands(&[(0, 1)])
            .check(2, 1, CheckKind::PointerComparison, Status::Warning)
            .check(3, 1, CheckKind::Assert, Status::Ok)
            .check(4, 1, CheckKind::PointerOverflow, Status::Warning)
            .timing(ANALYZER_PASS, 1.23456)
            .timing("ikos-analyzer.value", 1.0)
            .build();
        MemoryStore::from_dump(dump, "out.json").unwrap()
    }

    #[test]
    fn suite_counts_come_from_summary() {
        let store = create_test_store();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let xml = render_junit(&report, &RenderContext::default()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xml.contains(
            "<testsuite name=\".checkreport-analysis-results\" tests=\"4\" errors=\"0\" failures=\"3\" time=\"1.235\" skipped=\"0\">"
        ));
        assert!(xml.ends_with("</testsuite>\n"));
    }

    #[test]
    fn one_failing_testcase_per_error_or_warning() {
        let store = create_test_store();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let xml = render_junit(&report, &RenderContext::default()).unwrap();

        assert_eq!(xml.matches("<testcase ").count(), 3);
        assert_eq!(xml.matches("<failure ").count(), 3);
        assert!(xml.contains(
            "<testcase name=\"error: null-pointer-deref (src/main.c:4)\" classname=\".checkreport-analysis-results\">\n    <failure message=\"pointer &apos;p&apos; is null\"/>"
        ));
        assert!(xml.contains("name=\"warning: pointer-overflow (?:?)\""));
    }

    #[test]
    fn missing_timing_renders_zero() {
        let store = MemoryStore::from_dump(StoreBuilder::new().build(), "out.json").unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let xml = render_junit(&report, &RenderContext::default()).unwrap();
        assert!(xml.contains("tests=\"0\" errors=\"0\" failures=\"0\" time=\"0.000\""));
        assert!(!xml.contains("<testcase"));
    }

    #[test]
    fn escape_xml_handles_all_special_chars() {
        assert_eq!(escape_xml("&"), "&amp;");
        assert_eq!(escape_xml("<"), "&lt;");
        assert_eq!(escape_xml(">"), "&gt;");
        assert_eq!(escape_xml("\""), "&quot;");
        assert_eq!(escape_xml("'"), "&apos;");
        assert_eq!(escape_xml("normal text"), "normal text");
        assert_eq!(escape_xml("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
