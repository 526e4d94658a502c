//! Shared renderer plumbing and the format dispatcher.

use checkreport_types::{ReportFormat, Statement};

use crate::error::ReportError;
use crate::message::Verbosity;
use crate::paths::{PathFormatter, SourceCache};
use crate::report::Report;
use crate::store::CheckStore;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 3;
pub const DEFAULT_AUTO_THRESHOLD: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub verbosity: Verbosity,
    /// Call frames shown per context by the text renderer.
    pub max_call_depth: usize,
    /// Entry count above which `auto` prints a redirect notice.
    pub auto_threshold: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::default(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            auto_threshold: DEFAULT_AUTO_THRESHOLD,
        }
    }
}

/// Options plus the caches one render run reads through.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub options: RenderOptions,
    pub paths: PathFormatter,
    pub sources: SourceCache,
}

impl RenderContext {
    pub fn new(options: RenderOptions, paths: PathFormatter, sources: SourceCache) -> Self {
        Self {
            options,
            paths,
            sources,
        }
    }

    /// Display path of the statement's file, if it has one.
    pub(crate) fn statement_path(
        &self,
        store: &dyn CheckStore,
        statement: &Statement,
    ) -> Result<Option<String>, ReportError> {
        Ok(store.statement_path(statement)?.map(|p| self.paths.format(p)))
    }

    /// `file:line:col: ` prefix, with `?` for whatever is unknown.
    pub(crate) fn source_location(
        &self,
        store: &dyn CheckStore,
        statement: &Statement,
    ) -> Result<String, ReportError> {
        Ok(format!(
            "{}:{}:{}: ",
            self.statement_path(store, statement)?
                .unwrap_or_else(|| "?".to_string()),
            or_unknown(statement.line),
            or_unknown(statement.column),
        ))
    }
}

pub(crate) fn or_unknown(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Folds a multi-line message onto one line: bullets become `  +--> ` and
/// any remaining line break becomes `; `.
pub fn single_line(message: &str) -> String {
    message.replace("\n\t*", "  +--> ").replace('\n', "; ")
}

/// Renders the report in the requested format. `no` renders nothing.
pub fn render_report(
    format: ReportFormat,
    report: &Report<'_>,
    ctx: &RenderContext,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => crate::text::render_text(report, ctx),
        ReportFormat::Auto => crate::text::render_auto(report, ctx),
        ReportFormat::Json => crate::json::render_json(report),
        ReportFormat::Sarif => crate::sarif::render_sarif_json(report, ctx),
        ReportFormat::Csv => crate::csv::render_csv(report, ctx),
        ReportFormat::Junit => crate::junit::render_junit(report, ctx),
        ReportFormat::No => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_folds_bullets_and_breaks() {
        assert_eq!(
            single_line("free of:\n\t* a\n\t* b"),
            "free of:  +-->  a  +-->  b"
        );
        assert_eq!(
            single_line("unaligned\npointer offset is unknown"),
            "unaligned; pointer offset is unknown"
        );
        assert_eq!(single_line("plain"), "plain");
    }

    #[test]
    fn defaults_match_documented_values() {
        let options = RenderOptions::default();
        assert_eq!(options.verbosity.level(), 1);
        assert_eq!(options.max_call_depth, 3);
        assert_eq!(options.auto_threshold, 15);
    }
}
