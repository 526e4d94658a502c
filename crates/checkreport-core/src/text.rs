//! Plain-text renderer and the `auto` wrapper around it.

use checkreport_types::Statement;

use crate::error::ReportError;
use crate::message::generate_message;
use crate::render::RenderContext;
use crate::report::Report;
use crate::store::CheckStore;

/// Renders entries as compiler-style diagnostics.
///
/// A `path: In function 'f':` header is printed whenever the file or the
/// function changes. Each entry is `file:line:col: status: message`, followed
/// by the source line and a caret when the file is readable. From verbosity 3
/// the calling contexts of the entry are listed too.
pub fn render_text(report: &Report<'_>, ctx: &RenderContext) -> Result<String, ReportError> {
    let store = report.store();
    let mut out = String::new();
    let mut current_group = None;

    for entry in report.ordered()? {
        let statement = store.statement(entry.statement_id)?;
        let function = store.function(statement.function_id)?;
        let message = generate_message(store, entry, ctx.options.verbosity)?;

        let group = (function.file_id, function.id);
        if current_group != Some(group) {
            let path = match function.file_id {
                Some(id) => ctx.paths.format(&store.file(id)?.path),
                None => "?".to_string(),
            };
            out.push_str(&format!("{path}: In function '{}':\n", function.pretty_name()));
            current_group = Some(group);
        }

        let location = ctx.source_location(store, statement)?;
        let status = entry.status.label();
        let indent = " ".repeat(location.chars().count() + status.len() + 2);
        out.push_str(&location);
        out.push_str(status);
        out.push_str(": ");
        out.push_str(&message.replace('\n', &format!("\n{indent}")));
        out.push('\n');

        write_source_code(&mut out, store, statement, ctx)?;

        if ctx.options.verbosity.level() >= 3 {
            for &context_id in &entry.call_context_ids {
                write_call_context(&mut out, store, statement, context_id, ctx)?;
            }
        }
    }
    Ok(out)
}

/// Text report, unless it is empty or longer than the configured threshold.
pub fn render_auto(report: &Report<'_>, ctx: &RenderContext) -> Result<String, ReportError> {
    if report.is_empty() {
        return Ok("No entries.\n".to_string());
    }
    let threshold = ctx.options.auto_threshold;
    if report.len() > threshold {
        let location = report.store().location();
        return Ok(format!(
            "Report is too big (> {threshold} entries)\n\n\
             Use `checkreport --format text {location}` to examine the report in your terminal.\n\
             Use `checkreport --format sarif -o report.sarif {location}` to examine it in a SARIF viewer.\n"
        ));
    }
    render_text(report, ctx)
}

fn write_source_code(
    out: &mut String,
    store: &dyn CheckStore,
    statement: &Statement,
    ctx: &RenderContext,
) -> Result<(), ReportError> {
    let (Some(path), Some(line)) = (store.statement_path(statement)?, statement.line) else {
        return Ok(());
    };
    let Some(text) = ctx.sources.line(path, line) else {
        return Ok(());
    };

    out.push_str(&text);
    out.push('\n');
    if let Some(column) = statement.column {
        let caret_offset: String = text
            .chars()
            .take(column.saturating_sub(1) as usize)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        out.push_str(&caret_offset);
        out.push_str("^\n");
    }
    Ok(())
}

fn write_call_context(
    out: &mut String,
    store: &dyn CheckStore,
    statement: &Statement,
    context_id: u64,
    ctx: &RenderContext,
) -> Result<(), ReportError> {
    let mut context = store.call_context(context_id)?;
    out.push_str(&ctx.source_location(store, statement)?);
    out.push_str("note: ");

    if context.is_root() {
        let function = store.function(statement.function_id)?;
        out.push_str(&format!(
            "called from entry point '{}'\n",
            function.pretty_name()
        ));
        return Ok(());
    }

    out.push_str("called from:\n");
    for _ in 0..ctx.options.max_call_depth {
        let Some(call_id) = context.call_id else {
            break;
        };
        let call = store.statement(call_id)?;
        let caller = store.function(call.function_id)?;
        out.push_str(&ctx.source_location(store, call)?);
        out.push_str(&format!("function '{}'\n", caller.pretty_name()));
        write_source_code(out, store, call, ctx)?;

        let parent_id = context.parent_id.ok_or(ReportError::MissingField {
            table: "call context",
            id: context.id,
            field: "parent_id",
        })?;
        context = store.call_context(parent_id)?;
    }
    Ok(())
}
