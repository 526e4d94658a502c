//! Reduction of the checks of one (statement, call context) pair to a verdict.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::iter::Peekable;

use checkreport_types::{CheckKind, Checker, OperandRef, Status};

use crate::evidence::Evidence;
use crate::store::Check;

/// Identity of a diagnostic: equal tuples seen under different call contexts
/// are the same diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckTuple {
    pub kind: CheckKind,
    pub operands: Vec<OperandRef>,
    pub evidence: Evidence,
}

impl CheckTuple {
    pub fn of(check: &Check) -> Self {
        Self {
            kind: check.kind,
            operands: check.operands.clone(),
            evidence: check.evidence.clone(),
        }
    }
}

/// Distinct tuples, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TupleSet {
    seen: HashSet<CheckTuple>,
    order: Vec<CheckTuple>,
}

impl TupleSet {
    pub fn insert(&mut self, tuple: CheckTuple) -> bool {
        if self.seen.contains(&tuple) {
            return false;
        }
        self.seen.insert(tuple.clone());
        self.order.push(tuple);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckTuple> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementVerdict {
    pub status: Status,
    pub errors: TupleSet,
    pub warnings: TupleSet,
    /// Present only when OK tuples were requested.
    pub oks: Option<TupleSet>,
    /// Present only when contributing checkers were requested.
    pub checkers: Option<BTreeSet<Checker>>,
}

impl StatementVerdict {
    pub fn has_checker(&self, checker: Checker) -> bool {
        self.checkers.as_ref().is_some_and(|c| c.contains(&checker))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReduceOptions {
    pub keep_oks: bool,
    pub keep_checkers: bool,
}

/// Reduces the checks of one (statement, call context) group.
///
/// The group is UNREACHABLE only when every check in it is; otherwise
/// unreachable checks are ignored and the status is the most severe of the
/// remaining ones (ERROR over WARNING over OK).
pub fn reduce<'a, I>(checks: I, options: ReduceOptions) -> StatementVerdict
where
    I: IntoIterator<Item = &'a Check>,
{
    let mut verdict = StatementVerdict {
        status: Status::Ok,
        errors: TupleSet::default(),
        warnings: TupleSet::default(),
        oks: options.keep_oks.then(TupleSet::default),
        checkers: options.keep_checkers.then(BTreeSet::new),
    };

    let mut reachable = false;
    for check in checks {
        if let Some(checkers) = verdict.checkers.as_mut() {
            checkers.insert(check.checker);
        }

        match check.status {
            Status::Unreachable => continue,
            Status::Error => {
                verdict.status = Status::Error;
                verdict.errors.insert(CheckTuple::of(check));
            }
            Status::Warning => {
                if verdict.status == Status::Ok {
                    verdict.status = Status::Warning;
                }
                verdict.warnings.insert(CheckTuple::of(check));
            }
            Status::Ok => {
                if let Some(oks) = verdict.oks.as_mut() {
                    oks.insert(CheckTuple::of(check));
                }
            }
        }
        reachable = true;
    }

    if !reachable {
        verdict.status = Status::Unreachable;
    }
    verdict
}

/// Adapter yielding runs of adjacent items that share a key.
pub struct GroupAdjacent<I: Iterator, F> {
    iter: Peekable<I>,
    key: F,
}

pub fn group_adjacent<I, K, F>(items: I, key: F) -> GroupAdjacent<I::IntoIter, F>
where
    I: IntoIterator,
    F: Fn(&I::Item) -> K,
    K: PartialEq,
{
    GroupAdjacent {
        iter: items.into_iter().peekable(),
        key,
    }
}

impl<I, K, F> Iterator for GroupAdjacent<I, F>
where
    I: Iterator,
    F: Fn(&I::Item) -> K,
    K: PartialEq,
{
    type Item = (K, Vec<I::Item>);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.iter.next()?;
        let key = (self.key)(&first);
        let mut group = vec![first];
        while let Some(item) = self.iter.next_if(|item| (self.key)(item) == key) {
            group.push(item);
        }
        Some((key, group))
    }
}

/// Tuples observed across the contexts of one statement, each with the
/// contexts that produced it, in first-seen order.
#[derive(Debug, Default)]
pub struct TupleContexts {
    index: HashMap<CheckTuple, usize>,
    entries: Vec<(CheckTuple, Vec<u64>)>,
}

impl TupleContexts {
    pub fn add(&mut self, tuple: &CheckTuple, context_id: u64) {
        match self.index.get(tuple) {
            Some(&i) => {
                let contexts = &mut self.entries[i].1;
                if !contexts.contains(&context_id) {
                    contexts.push(context_id);
                }
            }
            None => {
                self.index.insert(tuple.clone(), self.entries.len());
                self.entries.push((tuple.clone(), vec![context_id]));
            }
        }
    }

    pub fn into_entries(self) -> Vec<(CheckTuple, Vec<u64>)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: u64, status: Status, checker: Checker) -> Check {
        Check {
            id,
            kind: CheckKind::NullPointerDereference,
            checker,
            status,
            statement_id: 1,
            call_context_id: 1,
            operands: vec![OperandRef(0, 10)],
            evidence: Evidence::None,
        }
    }

    const ALL: ReduceOptions = ReduceOptions {
        keep_oks: true,
        keep_checkers: true,
    };

    #[test]
    fn error_wins_over_warning_and_ok() {
        let checks = [
            check(1, Status::Ok, Checker::NullPointerDereference),
            check(2, Status::Warning, Checker::NullPointerDereference),
            check(3, Status::Error, Checker::NullPointerDereference),
        ];
        let verdict = reduce(&checks, ALL);
        assert_eq!(verdict.status, Status::Error);
    }

    #[test]
    fn all_unreachable_short_circuits() {
        let checks = [
            check(1, Status::Unreachable, Checker::DeadCode),
            check(2, Status::Unreachable, Checker::NullPointerDereference),
        ];
        let verdict = reduce(&checks, ALL);
        assert_eq!(verdict.status, Status::Unreachable);
        assert!(verdict.errors.is_empty());
        assert!(verdict.warnings.is_empty());
        assert!(verdict.oks.as_ref().is_some_and(TupleSet::is_empty));
        assert!(verdict.has_checker(Checker::DeadCode));
    }

    #[test]
    fn unreachable_checks_are_ignored_when_something_is_reachable() {
        let checks = [
            check(1, Status::Unreachable, Checker::DeadCode),
            check(2, Status::Warning, Checker::NullPointerDereference),
        ];
        let verdict = reduce(&checks, ALL);
        assert_eq!(verdict.status, Status::Warning);
        assert_eq!(verdict.warnings.len(), 1);
    }

    #[test]
    fn identical_tuples_collapse() {
        let checks = [
            check(1, Status::Error, Checker::NullPointerDereference),
            check(2, Status::Error, Checker::NullPointerDereference),
        ];
        let verdict = reduce(&checks, ALL);
        assert_eq!(verdict.errors.len(), 1);
    }

    #[test]
    fn oks_and_checkers_are_optional() {
        let checks = [check(1, Status::Ok, Checker::DeadCode)];
        let verdict = reduce(&checks, ReduceOptions::default());
        assert_eq!(verdict.status, Status::Ok);
        assert!(verdict.oks.is_none());
        assert!(!verdict.has_checker(Checker::DeadCode));
    }

    #[test]
    fn group_adjacent_splits_runs() {
        let groups: Vec<(u32, Vec<u32>)> =
            group_adjacent(vec![1, 1, 2, 3, 3, 3], |n| *n).collect();
        assert_eq!(
            groups,
            vec![(1, vec![1, 1]), (2, vec![2]), (3, vec![3, 3, 3])]
        );
    }

    #[test]
    fn tuple_contexts_keep_first_seen_order() {
        let a = CheckTuple::of(&check(1, Status::Error, Checker::NullPointerDereference));
        let mut b = a.clone();
        b.kind = CheckKind::Assert;
        let mut contexts = TupleContexts::default();
        contexts.add(&a, 1);
        contexts.add(&b, 1);
        contexts.add(&a, 2);
        contexts.add(&a, 2);
        let entries = contexts.into_entries();
        assert_eq!(entries[0].1, vec![1, 2]);
        assert_eq!(entries[1].0.kind, CheckKind::Assert);
    }
}
