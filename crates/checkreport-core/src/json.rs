//! JSON renderer: the store's tables plus the report entries.

use checkreport_types::{
    CallContext, CheckKind, File, Function, MemoryLocation, Operand, OperandRef, Statement, Status,
};
use serde::Serialize;

use crate::error::ReportError;
use crate::evidence::Evidence;
use crate::report::Report;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub files: Vec<&'a File>,
    pub functions: Vec<&'a Function>,
    pub statements: Vec<&'a Statement>,
    pub operands: Vec<&'a Operand>,
    pub call_contexts: Vec<&'a CallContext>,
    pub memory_locations: Vec<&'a MemoryLocation>,
    pub reports: Vec<JsonEntry<'a>>,
}

/// One report entry; `info` is the decoded evidence, `null` when absent.
#[derive(Debug, Serialize)]
pub struct JsonEntry<'a> {
    pub kind: CheckKind,
    pub status: Status,
    pub statement_id: u64,
    pub call_context_ids: &'a [u64],
    pub operands: &'a [OperandRef],
    pub info: &'a Evidence,
}

pub fn json_report<'a>(report: &'a Report<'a>) -> Result<JsonReport<'a>, ReportError> {
    let store = report.store();
    let reports = report
        .ordered()?
        .into_iter()
        .map(|entry| JsonEntry {
            kind: entry.kind,
            status: entry.status,
            statement_id: entry.statement_id,
            call_context_ids: &entry.call_context_ids,
            operands: &entry.operands,
            info: &entry.evidence,
        })
        .collect();

    Ok(JsonReport {
        files: store.files().collect(),
        functions: store.functions().collect(),
        statements: store.statements().collect(),
        operands: store.operands().collect(),
        call_contexts: store.call_contexts().collect(),
        memory_locations: store.memory_locations().collect(),
        reports,
    })
}

pub fn render_json(report: &Report<'_>) -> Result<String, ReportError> {
    let mut out = serde_json::to_string(&json_report(report)?)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{build_report, ReportPlan};
    use crate::store::MemoryStore;
    use checkreport_testkit::StoreBuilder;
    use checkreport_types::ValueKind;
    use serde_json::{json, Value};

    #[test]
    fn entries_carry_decoded_info() {
        let dump = StoreBuilder::new()
            .file(1, "a.c")
            .function(1, "main", Some(1))
            .statement(1, 1, Some(1), 3, 7)
            .operand(1, ValueKind::LocalVariable, "main.d")
            .root_context(1, 1)
            .check(1, 1, CheckKind::DivisionByZero, Status::Warning)
            .operands(&[(1, 1)])
            .info(json!({"type": "s32", "lb": -5, "ub": 5}))
            .build();
        let store = MemoryStore::from_dump(dump, "out.json").unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();

        let value: Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["files"], json!([{"id": 1, "path": "a.c"}]));
        assert_eq!(
            value["reports"],
            json!([{
                "kind": 4,
                "status": 1,
                "statement_id": 1,
                "call_context_ids": [1],
                "operands": [[1, 1]],
                "info": {"type": "s32", "lb": -5, "ub": 5}
            }])
        );
    }

    #[test]
    fn empty_report_has_empty_tables() {
        let store = MemoryStore::from_dump(StoreBuilder::new().build(), "out.json").unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let value: Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["reports"], json!([]));
        assert_eq!(value["memory_locations"], json!([]));
    }
}
