//! Per-statement counts over the whole store, and the summary block.

use std::collections::BTreeSet;

use checkreport_types::{Checker, Status};

use crate::aggregate::{group_adjacent, reduce, ReduceOptions, TupleSet};
use crate::error::ReportError;
use crate::store::{Check, CheckStore};

/// Counts of checked statements by outcome.
///
/// A statement counts once as safe when any of its contexts is safe; errors
/// and warnings count once per distinct check tuple; a statement counts as
/// unreachable when every context is and the dead-code checker agrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub ok: usize,
    pub error: usize,
    pub warning: usize,
    pub unreachable: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.ok + self.error + self.warning + self.unreachable
    }

    pub fn verdict(&self) -> &'static str {
        if self.error != 0 {
            "The program is definitely UNSAFE"
        } else if self.warning != 0 {
            "The program is potentially UNSAFE"
        } else {
            "The program is SAFE"
        }
    }
}

/// Summarises every check in the store, ignoring display filters.
pub fn summarize(store: &dyn CheckStore) -> Result<Summary, ReportError> {
    let options = ReduceOptions {
        keep_oks: false,
        keep_checkers: true,
    };
    let mut summary = Summary::default();

    for (statement_id, checks) in group_adjacent(store.scan_checks(), |c: &&Check| c.statement_id) {
        store.statement(statement_id)?;

        let mut statuses = BTreeSet::new();
        let mut checkers = BTreeSet::new();
        let mut errors = TupleSet::default();
        let mut warnings = TupleSet::default();
        for (_, group) in group_adjacent(checks, |c: &&Check| c.call_context_id) {
            let verdict = reduce(group, options);
            statuses.insert(verdict.status);
            checkers.extend(verdict.checkers.into_iter().flatten());
            for tuple in verdict.errors.iter() {
                errors.insert(tuple.clone());
            }
            for tuple in verdict.warnings.iter() {
                warnings.insert(tuple.clone());
            }
        }

        if statuses.iter().all(|s| *s == Status::Unreachable) {
            if checkers.contains(&Checker::DeadCode) {
                summary.unreachable += 1;
            }
            continue;
        }
        if statuses.contains(&Status::Ok) {
            summary.ok += 1;
        }
        summary.error += errors.len();
        summary.warning += warnings.len();
    }

    Ok(summary)
}

/// The `# Summary:` block; `full` adds the per-outcome counts.
pub fn render_summary(summary: &Summary, full: bool) -> String {
    let mut out = String::from("# Summary:\n");
    if full {
        out.push_str(&format!(
            "Total number of checks                : {}\n",
            summary.total()
        ));
        out.push_str(&format!(
            "Total number of unreachable checks    : {}\n",
            summary.unreachable
        ));
        out.push_str(&format!(
            "Total number of safe checks           : {}\n",
            summary.ok
        ));
        out.push_str(&format!(
            "Total number of definite unsafe checks: {}\n",
            summary.error
        ));
        out.push_str(&format!(
            "Total number of warnings              : {}\n",
            summary.warning
        ));
        out.push('\n');
    }
    out.push_str(summary.verdict());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use checkreport_testkit::StoreBuilder;
    use checkreport_types::{CheckKind, ValueKind};

    fn store(builder: StoreBuilder) -> MemoryStore {
        let builder = builder
            .function(1, "main", None)
            .statement(1, 1, None, 1, 1)
            .statement(2, 1, None, 2, 1)
            .statement(3, 1, None, 3, 1)
            .operand(1, ValueKind::LocalVariable, "p")
            .root_context(1, 1)
            .root_context(2, 1);
        MemoryStore::from_dump(builder.build(), "out.json").unwrap()
    }

    #[test]
    fn counts_follow_statement_aggregation() {
        let store = store(
            StoreBuilder::new()
                // statement 1: safe in one context, error in the other
                .check(1, 1, CheckKind::NullPointerDereference, Status::Ok)
                .operands(&[(0, 1)])
                .check(1, 2, CheckKind::NullPointerDereference, Status::Error)
                .operands(&[(0, 1)])
                // statement 2: the same warning twice
                .check(2, 1, CheckKind::Assert, Status::Warning)
                .check(2, 2, CheckKind::Assert, Status::Warning)
                // statement 3: dead everywhere
                .check(3, 1, CheckKind::Unreachable, Status::Unreachable)
                .check(3, 2, CheckKind::Unreachable, Status::Unreachable),
        );
        let summary = summarize(&store).unwrap();
        assert_eq!(
            summary,
            Summary {
                ok: 1,
                error: 1,
                warning: 1,
                unreachable: 1
            }
        );
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.verdict(), "The program is definitely UNSAFE");
    }

    #[test]
    fn unreachable_without_dead_code_is_not_counted() {
        let store = store(StoreBuilder::new().check_by(
            1,
            1,
            CheckKind::Assert,
            Checker::AssertionProver,
            Status::Unreachable,
        ));
        assert_eq!(summarize(&store).unwrap(), Summary::default());
    }

    #[test]
    fn summary_block_layout() {
        let summary = Summary {
            ok: 3,
            error: 0,
            warning: 2,
            unreachable: 1,
        };
        assert_eq!(
            render_summary(&summary, true),
            "# Summary:\n\
             Total number of checks                : 6\n\
             Total number of unreachable checks    : 1\n\
             Total number of safe checks           : 3\n\
             Total number of definite unsafe checks: 0\n\
             Total number of warnings              : 2\n\
             \n\
             The program is potentially UNSAFE\n"
        );
        assert_eq!(
            render_summary(&Summary::default(), false),
            "# Summary:\nThe program is SAFE\n"
        );
    }
}
