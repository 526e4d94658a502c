//! Core engine: aggregates analyzer checks into a report and renders it.

mod aggregate;
mod csv;
mod error;
mod evidence;
mod filter;
mod json;
mod junit;
mod message;
mod names;
mod numeric;
mod paths;
mod raw;
mod render;
mod report;
mod sarif;
mod store;
mod summary;
mod text;
mod timing;

pub use aggregate::{
    group_adjacent, reduce, CheckTuple, ReduceOptions, StatementVerdict, TupleContexts, TupleSet,
};
pub use csv::{render_csv, CSV_HEADER};
pub use error::{FilterError, ReportError};
pub use evidence::{
    AlignmentInfo, AlignmentTarget, BufferOverflowInfo, BufferTarget, CallTarget, CalleeInfo,
    Evidence, FreeInfo, FreeTarget, FunctionCallInfo, IntOverflowInfo,
};
pub use filter::{CheckerFilter, StatusFilter, DEFAULT_ANALYSES_FILTER, DEFAULT_STATUS_FILTER};
pub use json::{json_report, render_json, JsonEntry, JsonReport};
pub use junit::{render_junit, TESTSUITE_NAME};
pub use message::{generate_message, Verbosity};
pub use names::{
    call_chain, call_context_path, memory_location, ordinal, source_variable, statement_operand,
};
pub use numeric::{Congruence, IntType, Interval, MachineInt, Signedness};
pub use paths::{PathFormatter, SourceCache};
pub use raw::render_raw_checks;
pub use render::{
    render_report, single_line, RenderContext, RenderOptions, DEFAULT_AUTO_THRESHOLD,
    DEFAULT_MAX_CALL_DEPTH,
};
pub use report::{build_report, Report, ReportPlan, StatementReport};
pub use sarif::{render_sarif_for_report, render_sarif_json, SarifLevel, SarifReport};
pub use store::{Check, CheckStore, MemoryStore};
pub use summary::{render_summary, summarize, Summary};
pub use text::{render_auto, render_text};
pub use timing::{analyzer_time, format_time, render_timing};
