//! Builds the deduplicated report model from the raw check stream.

use checkreport_types::{CheckKind, Checker, OperandRef, Status};
use tracing::debug;

use crate::aggregate::{group_adjacent, reduce, ReduceOptions, StatementVerdict, TupleContexts};
use crate::error::ReportError;
use crate::evidence::Evidence;
use crate::filter::{CheckerFilter, StatusFilter};
use crate::store::{Check, CheckStore};

#[derive(Debug, Clone, Default)]
pub struct ReportPlan {
    pub status_filter: StatusFilter,
    pub checker_filter: CheckerFilter,
}

/// One emitted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementReport {
    pub kind: CheckKind,
    pub status: Status,
    pub statement_id: u64,
    pub call_context_ids: Vec<u64>,
    pub operands: Vec<OperandRef>,
    pub evidence: Evidence,
}

/// The report entries of one run, plus the store they refer to.
pub struct Report<'s> {
    store: &'s dyn CheckStore,
    entries: Vec<StatementReport>,
}

impl<'s> Report<'s> {
    pub fn new(store: &'s dyn CheckStore, entries: Vec<StatementReport>) -> Self {
        Self { store, entries }
    }

    pub fn store(&self) -> &'s dyn CheckStore {
        self.store
    }

    /// Entries in build order (statement id, then severity group).
    pub fn entries(&self) -> &[StatementReport] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in display order: severity (error, warning, ok, unreachable),
    /// then file, line, column and check kind. Statements without a location
    /// sort first within their severity.
    pub fn ordered(&self) -> Result<Vec<&StatementReport>, ReportError> {
        let mut keyed = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let statement = self.store.statement(entry.statement_id)?;
            let key = (
                severity_rank(entry.status),
                statement.file_id,
                statement.line,
                statement.column,
                entry.kind,
            );
            keyed.push((key, entry));
        }
        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
    }
}

fn severity_rank(status: Status) -> u8 {
    match status {
        Status::Error => 0,
        Status::Warning => 1,
        Status::Ok => 2,
        Status::Unreachable => 3,
    }
}

/// Builds the report for one run.
///
/// Checks outside the filters are never read into a verdict, except that
/// dead-code checks are kept when unreachable statements are displayed but
/// safe ones are not: a reachable context is only visible through the
/// dead-code checker's OK verdicts.
pub fn build_report<'s>(
    store: &'s dyn CheckStore,
    plan: &ReportPlan,
) -> Result<Report<'s>, ReportError> {
    let display_oks = plan.status_filter.contains(Status::Ok);
    let display_unreachables = plan.status_filter.contains(Status::Unreachable)
        && plan.checker_filter.contains(Checker::DeadCode);
    let keep_dead_code = display_unreachables && !display_oks;

    let selected = store.scan_checks().filter(|check| {
        (plan.status_filter.contains(check.status) && plan.checker_filter.contains(check.checker))
            || (keep_dead_code && check.checker == Checker::DeadCode)
    });

    let options = ReduceOptions {
        keep_oks: display_oks,
        keep_checkers: display_unreachables,
    };

    let mut entries = Vec::new();
    for (statement_id, checks) in group_adjacent(selected, |c: &&Check| c.statement_id) {
        store.statement(statement_id)?;

        let mut verdicts = Vec::new();
        for (context_id, group) in group_adjacent(checks, |c: &&Check| c.call_context_id) {
            store.call_context(context_id)?;
            verdicts.push((context_id, reduce(group, options)));
        }
        emit_statement(statement_id, &verdicts, display_unreachables, &mut entries);
    }

    debug!(entries = entries.len(), "built report");
    Ok(Report::new(store, entries))
}

fn emit_statement(
    statement_id: u64,
    verdicts: &[(u64, StatementVerdict)],
    display_unreachables: bool,
    entries: &mut Vec<StatementReport>,
) {
    if verdicts.iter().all(|(_, v)| v.status == Status::Unreachable) {
        let dead_code_agrees = verdicts
            .iter()
            .any(|(_, v)| v.has_checker(Checker::DeadCode));
        if display_unreachables && dead_code_agrees {
            entries.push(StatementReport {
                kind: CheckKind::Unreachable,
                status: Status::Unreachable,
                statement_id,
                call_context_ids: verdicts.iter().map(|(id, _)| *id).collect(),
                operands: vec![],
                evidence: Evidence::None,
            });
        }
        return;
    }

    let mut errors = TupleContexts::default();
    let mut warnings = TupleContexts::default();
    let mut oks = TupleContexts::default();
    for (context_id, verdict) in verdicts {
        for tuple in verdict.errors.iter() {
            errors.add(tuple, *context_id);
        }
        for tuple in verdict.warnings.iter() {
            warnings.add(tuple, *context_id);
        }
        for tuple in verdict.oks.iter().flat_map(|set| set.iter()) {
            oks.add(tuple, *context_id);
        }
    }

    for (status, tuples) in [
        (Status::Error, errors),
        (Status::Warning, warnings),
        (Status::Ok, oks),
    ] {
        for (tuple, call_context_ids) in tuples.into_entries() {
            entries.push(StatementReport {
                kind: tuple.kind,
                status,
                statement_id,
                call_context_ids,
                operands: tuple.operands,
                evidence: tuple.evidence,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use checkreport_types::{
        CallContext, Function, RawCheck, Statement, StatementKind, StoreDump,
    };

    fn dump(statement_ids: &[u64], context_ids: &[u64], checks: Vec<RawCheck>) -> StoreDump {
        StoreDump {
            functions: vec![Function {
                id: 1,
                name: "main".into(),
                demangled: None,
                definition: true,
                file_id: None,
                line: None,
            }],
            statements: statement_ids
                .iter()
                .map(|&id| Statement {
                    id,
                    kind: StatementKind::Load,
                    function_id: 1,
                    file_id: None,
                    line: Some(id as u32),
                    column: Some(1),
                })
                .collect(),
            call_contexts: context_ids
                .iter()
                .map(|&id| CallContext {
                    id,
                    call_id: None,
                    function_id: Some(1),
                    parent_id: None,
                })
                .collect(),
            checks,
            ..StoreDump::default()
        }
    }

    fn raw(
        id: u64,
        statement_id: u64,
        context: u64,
        kind: CheckKind,
        checker: Checker,
        status: Status,
    ) -> RawCheck {
        RawCheck {
            id,
            kind,
            checker,
            status,
            statement_id,
            call_context_id: context,
            operands: Some(vec![OperandRef(0, 1)]),
            info: None,
        }
    }

    fn dead(id: u64, statement_id: u64, context: u64, status: Status) -> RawCheck {
        raw(id, statement_id, context, CheckKind::Unreachable, Checker::DeadCode, status)
    }

    #[test]
    fn same_tuple_in_two_contexts_is_one_entry() {
        let store = MemoryStore::from_dump(
            dump(
                &[7],
                &[1, 2],
                vec![
                    raw(1, 7, 1, CheckKind::NullPointerDereference, Checker::NullPointerDereference, Status::Error),
                    raw(2, 7, 2, CheckKind::NullPointerDereference, Checker::NullPointerDereference, Status::Error),
                ],
            ),
            "mem",
        )
        .unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].call_context_ids, vec![1, 2]);
        assert_eq!(report.entries()[0].status, Status::Error);
    }

    #[test]
    fn unreachable_in_every_context_is_one_entry() {
        let store = MemoryStore::from_dump(
            dump(
                &[3],
                &[1, 2, 4],
                vec![
                    dead(1, 3, 1, Status::Unreachable),
                    dead(2, 3, 2, Status::Unreachable),
                    dead(3, 3, 4, Status::Unreachable),
                ],
            ),
            "mem",
        )
        .unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        assert_eq!(report.len(), 1);
        let entry = &report.entries()[0];
        assert_eq!(entry.kind, CheckKind::Unreachable);
        assert_eq!(entry.call_context_ids, vec![1, 2, 4]);
    }

    #[test]
    fn unreachable_in_some_contexts_is_not_reported() {
        let store = MemoryStore::from_dump(
            dump(
                &[3],
                &[1, 2, 4],
                vec![
                    dead(1, 3, 1, Status::Unreachable),
                    dead(2, 3, 2, Status::Unreachable),
                    dead(3, 3, 4, Status::Ok),
                ],
            ),
            "mem",
        )
        .unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn mixed_unreachable_and_ok_reports_ok_when_safe_is_displayed() {
        let store = MemoryStore::from_dump(
            dump(
                &[3],
                &[1, 2],
                vec![dead(1, 3, 1, Status::Unreachable), dead(2, 3, 2, Status::Ok)],
            ),
            "mem",
        )
        .unwrap();
        let plan = ReportPlan {
            status_filter: StatusFilter::all(),
            checker_filter: CheckerFilter::all(),
        };
        let report = build_report(&store, &plan).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].status, Status::Ok);
        assert_eq!(report.entries()[0].call_context_ids, vec![2]);
    }

    #[test]
    fn unreachable_without_dead_code_checker_is_not_reported() {
        let store = MemoryStore::from_dump(
            dump(
                &[3],
                &[1],
                vec![raw(1, 3, 1, CheckKind::Assert, Checker::AssertionProver, Status::Unreachable)],
            ),
            "mem",
        )
        .unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn dangling_call_context_aborts() {
        let store = MemoryStore::from_dump(
            dump(
                &[3],
                &[],
                vec![raw(1, 3, 9, CheckKind::Assert, Checker::AssertionProver, Status::Error)],
            ),
            "mem",
        )
        .unwrap();
        let err = build_report(&store, &ReportPlan::default()).err().unwrap();
        assert!(matches!(err, ReportError::UnknownId { table: "call context", id: 9 }));
    }

    #[test]
    fn ordered_puts_errors_before_warnings() {
        let store = MemoryStore::from_dump(
            dump(
                &[1, 2],
                &[1],
                vec![
                    raw(1, 1, 1, CheckKind::Assert, Checker::AssertionProver, Status::Warning),
                    raw(2, 2, 1, CheckKind::Assert, Checker::AssertionProver, Status::Error),
                ],
            ),
            "mem",
        )
        .unwrap();
        let report = build_report(&store, &ReportPlan::default()).unwrap();
        let ordered = report.ordered().unwrap();
        assert_eq!(ordered[0].status, Status::Error);
        assert_eq!(ordered[1].status, Status::Warning);
    }

    #[test]
    fn checker_filter_drops_checks_before_grouping() {
        let store = MemoryStore::from_dump(
            dump(
                &[1],
                &[1],
                vec![raw(1, 1, 1, CheckKind::NullPointerDereference, Checker::NullPointerDereference, Status::Error)],
            ),
            "mem",
        )
        .unwrap();
        let plan = ReportPlan {
            status_filter: StatusFilter::default(),
            checker_filter: CheckerFilter::parse("*,-nullity").unwrap(),
        };
        assert!(build_report(&store, &plan).unwrap().is_empty());
    }
}
