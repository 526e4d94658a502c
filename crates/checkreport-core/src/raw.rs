//! Unaggregated dump of every check, as an aligned ASCII table.

use crate::error::ReportError;
use crate::evidence::Evidence;
use crate::names::call_context_path;
use crate::render::{or_unknown, RenderContext};
use crate::store::{Check, CheckStore};

const CONTEXT_HEADER: &str = "context";
const HEADERS: [&str; 10] = [
    "function", "file", "line", "col", "stmt", "check", "checker", "result", "operands", "info",
];

/// Renders the `# Checks` table.
///
/// Rows are ordered by call context, statement, then check kind. The context
/// column only appears for interprocedural runs.
pub fn render_raw_checks(store: &dyn CheckStore, ctx: &RenderContext) -> Result<String, ReportError> {
    let with_context = store.is_interprocedural();

    let mut checks: Vec<&Check> = store.scan_checks().collect();
    checks.sort_by_key(|c| (c.call_context_id, c.statement_id, c.kind, c.id));

    let mut header: Vec<String> = Vec::with_capacity(HEADERS.len() + 1);
    if with_context {
        header.push(CONTEXT_HEADER.to_string());
    }
    header.extend(HEADERS.iter().map(|h| h.to_string()));

    let mut rows = Vec::with_capacity(checks.len());
    for check in checks {
        rows.push(raw_row(store, ctx, check, with_context)?);
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::from("# Checks\n");
    push_row(&mut out, &header, &widths);
    out.push('+');
    for width in &widths {
        out.push_str(&"-".repeat(width + 2));
        out.push('+');
    }
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    Ok(out)
}

fn raw_row(
    store: &dyn CheckStore,
    ctx: &RenderContext,
    check: &Check,
    with_context: bool,
) -> Result<Vec<String>, ReportError> {
    let statement = store.statement(check.statement_id)?;
    let function = store.function(statement.function_id)?;

    let mut row = Vec::with_capacity(HEADERS.len() + 1);
    if with_context {
        row.push(call_context_path(store, store.call_context(check.call_context_id)?)?);
    }
    row.push(function.pretty_name().to_string());
    row.push(ctx.statement_path(store, statement)?.unwrap_or_default());
    row.push(or_unknown(statement.line));
    row.push(or_unknown(statement.column));
    row.push(statement.id.to_string());
    row.push(check.kind.short_name().to_string());
    row.push(check.checker.short_name().to_string());
    row.push(check.status.as_str().to_string());

    let mut operands = Vec::with_capacity(check.operands.len());
    for operand_ref in &check.operands {
        let operand = store.operand(operand_ref.operand_id())?;
        operands.push(format!("{}: {}", operand_ref.position(), operand.repr));
    }
    row.push(operands.join(", "));

    row.push(match &check.evidence {
        Evidence::None => String::new(),
        evidence => serde_json::to_string(evidence)?,
    });
    Ok(row)
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count();
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(pad + 1));
        out.push('|');
    }
    out.push('\n');
}
