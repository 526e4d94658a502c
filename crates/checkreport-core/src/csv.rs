//! CSV output renderer.
//!
//! One row per report entry. CSV follows RFC 4180 for escaping, so messages
//! keep their line breaks inside quoted fields.

use crate::error::ReportError;
use crate::message::generate_message;
use crate::names::call_context_path;
use crate::render::RenderContext;
use crate::report::Report;

/// CSV header row.
pub const CSV_HEADER: &str = "file,function,line,column,statement_id,contexts,status,check,message";

/// Separator between the call contexts of one row.
pub const CONTEXT_SEPARATOR: &str = " | ";

/// Renders a Report as CSV.
///
/// The header is always written, even for an empty report.
pub fn render_csv(report: &Report<'_>, ctx: &RenderContext) -> Result<String, ReportError> {
    let store = report.store();
    let mut out = String::new();

    out.push_str(CSV_HEADER);
    out.push('\n');

    for entry in report.ordered()? {
        let statement = store.statement(entry.statement_id)?;
        let function = store.function(statement.function_id)?;

        let mut contexts = Vec::with_capacity(entry.call_context_ids.len());
        for &id in &entry.call_context_ids {
            contexts.push(call_context_path(store, store.call_context(id)?)?);
        }

        let fields = [
            store.statement_path(statement)?.unwrap_or("").to_string(),
            function.pretty_name().to_string(),
            statement.line.map(|l| l.to_string()).unwrap_or_default(),
            statement.column.map(|c| c.to_string()).unwrap_or_default(),
            statement.id.to_string(),
            contexts.join(CONTEXT_SEPARATOR),
            entry.status.as_str().to_string(),
            entry.kind.short_name().to_string(),
            generate_message(store, entry, ctx.options.verbosity)?,
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

/// Escapes a field for CSV according to RFC 4180.
///
/// Fields containing commas, double quotes, or newlines are quoted.
/// Double quotes within the field are escaped by doubling them.
fn escape_csv_field(s: &str) -> String {
    let needs_quoting = s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');

    if needs_quoting {
        let escaped = s.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_report, ReportPlan};
    use crate::store::MemoryStore;
    use checkreport_testkit::StoreBuilder;
    use checkreport_types::{CheckKind, Status, ValueKind};

    fn store() -> MemoryStore {
        let dump = StoreBuilder::new()
            .file(1, "src/a,b.c")
            .function(1, "main", Some(1))
            .function(2, "use", Some(1))
            .call_statement(1, 1, Some(1), 10, 3)
            .call_statement(2, 1, Some(1), 11, 3)
            .statement(3, 2, Some(1), 4, 12)
            .operand(1, ValueKind::LocalVariable, "p")
            .root_context(1, 1)
            .call_context(2, 1, 1, 1)
            .call_context(3, 2, 1, 1)
            .check(3, 2, CheckKind::NullPointerDereference, Status::Error)
            .operands(&[(0, 1)])
            .check(3, 3, CheckKind::NullPointerDereference, Status::Error)
            .operands(&[(0, 1)])
            .build();
        MemoryStore::from_dump(dump, "out.json").unwrap()
    }

    #[test]
    fn empty_report_is_just_the_header() {
        let store = MemoryStore::from_dump(StoreBuilder::new().build(), "out.json").unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let csv = render_csv(&report, &RenderContext::default()).unwrap();
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn contexts_are_joined_and_fields_escaped() {
        let store = store();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let csv = render_csv(&report, &RenderContext::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "\"src/a,b.c\",use,4,12,3,./main@10:3:1 | ./main@11:3:2,error,null-pointer-deref,pointer 'p' is null"
        );
    }

    #[test]
    fn escape_csv_field_quotes_special_characters() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv_field("two\nlines"), "\"two\nlines\"");
    }
}
