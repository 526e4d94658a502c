//! Read-only access to one analyzer run's persisted results.

use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;

use checkreport_types::{
    CallContext, CheckKind, Checker, File, Function, MemoryLocation, Operand, OperandRef, Status,
    Statement, StoreDump, TimingRecord,
};
use tracing::debug;

use crate::error::ReportError;
use crate::evidence::Evidence;

/// A check with its evidence payload decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub id: u64,
    pub kind: CheckKind,
    pub checker: Checker,
    pub status: Status,
    pub statement_id: u64,
    pub call_context_id: u64,
    pub operands: Vec<OperandRef>,
    pub evidence: Evidence,
}

/// Lookups by id fail with [`ReportError::UnknownId`]: a dangling reference
/// means the store is corrupt.
pub trait CheckStore {
    /// Display location of the store, e.g. the path it was loaded from.
    fn location(&self) -> &str;

    fn file(&self, id: u64) -> Result<&File, ReportError>;
    fn function(&self, id: u64) -> Result<&Function, ReportError>;
    fn statement(&self, id: u64) -> Result<&Statement, ReportError>;
    fn operand(&self, id: u64) -> Result<&Operand, ReportError>;
    fn call_context(&self, id: u64) -> Result<&CallContext, ReportError>;
    fn memory_location(&self, id: u64) -> Result<&MemoryLocation, ReportError>;

    /// All checks, ordered by statement id, then call-context id, then check id.
    fn scan_checks(&self) -> Box<dyn Iterator<Item = &Check> + '_>;

    fn files(&self) -> Box<dyn Iterator<Item = &File> + '_>;
    fn functions(&self) -> Box<dyn Iterator<Item = &Function> + '_>;
    fn statements(&self) -> Box<dyn Iterator<Item = &Statement> + '_>;
    fn operands(&self) -> Box<dyn Iterator<Item = &Operand> + '_>;
    fn call_contexts(&self) -> Box<dyn Iterator<Item = &CallContext> + '_>;
    fn memory_locations(&self) -> Box<dyn Iterator<Item = &MemoryLocation> + '_>;

    fn timing_records(&self) -> &[TimingRecord];
    fn setting(&self, name: &str) -> Option<&serde_json::Value>;

    /// Path of the file a statement belongs to, if it has one.
    fn statement_path(&self, statement: &Statement) -> Result<Option<&str>, ReportError> {
        match statement.file_id {
            Some(id) => Ok(Some(self.file(id)?.path.as_str())),
            None => Ok(None),
        }
    }

    /// Whether the run kept separate call contexts per callee.
    fn is_interprocedural(&self) -> bool {
        self.setting("procedural")
            .and_then(|v| v.as_str())
            .map_or(true, |v| v == "interprocedural")
    }
}

/// In-process store built from a [`StoreDump`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    location: String,
    files: BTreeMap<u64, File>,
    functions: BTreeMap<u64, Function>,
    statements: BTreeMap<u64, Statement>,
    operands: BTreeMap<u64, Operand>,
    call_contexts: BTreeMap<u64, CallContext>,
    memory_locations: BTreeMap<u64, MemoryLocation>,
    checks: Vec<Check>,
    times: Vec<TimingRecord>,
    settings: BTreeMap<String, serde_json::Value>,
}

fn index<T>(
    table: &'static str,
    rows: Vec<T>,
    id: impl Fn(&T) -> u64,
) -> Result<BTreeMap<u64, T>, ReportError> {
    let mut out = BTreeMap::new();
    for row in rows {
        let key = id(&row);
        match out.entry(key) {
            Entry::Occupied(_) => return Err(ReportError::DuplicateId { table, id: key }),
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }
    Ok(out)
}

fn lookup<'a, T>(
    map: &'a BTreeMap<u64, T>,
    table: &'static str,
    id: u64,
) -> Result<&'a T, ReportError> {
    map.get(&id).ok_or(ReportError::UnknownId { table, id })
}

impl MemoryStore {
    pub fn from_dump(dump: StoreDump, location: impl Into<String>) -> Result<Self, ReportError> {
        let mut checks = Vec::with_capacity(dump.checks.len());
        let mut seen = BTreeSet::new();
        for raw in dump.checks {
            if !seen.insert(raw.id) {
                return Err(ReportError::DuplicateId {
                    table: "check",
                    id: raw.id,
                });
            }
            checks.push(Check {
                id: raw.id,
                kind: raw.kind,
                checker: raw.checker,
                status: raw.status,
                statement_id: raw.statement_id,
                call_context_id: raw.call_context_id,
                operands: raw.operands.unwrap_or_default(),
                evidence: Evidence::decode(raw.kind, raw.info.as_ref())?,
            });
        }
        checks.sort_by_key(|c| (c.statement_id, c.call_context_id, c.id));

        let store = Self {
            location: location.into(),
            files: index("file", dump.files, |r| r.id)?,
            functions: index("function", dump.functions, |r| r.id)?,
            statements: index("statement", dump.statements, |r| r.id)?,
            operands: index("operand", dump.operands, |r| r.id)?,
            call_contexts: index("call context", dump.call_contexts, |r| r.id)?,
            memory_locations: index("memory location", dump.memory_locations, |r| r.id)?,
            checks,
            times: dump.times,
            settings: dump.settings,
        };
        debug!(
            location = %store.location,
            checks = store.checks.len(),
            statements = store.statements.len(),
            call_contexts = store.call_contexts.len(),
            "loaded check store"
        );
        Ok(store)
    }
}

impl CheckStore for MemoryStore {
    fn location(&self) -> &str {
        &self.location
    }

    fn file(&self, id: u64) -> Result<&File, ReportError> {
        lookup(&self.files, "file", id)
    }

    fn function(&self, id: u64) -> Result<&Function, ReportError> {
        lookup(&self.functions, "function", id)
    }

    fn statement(&self, id: u64) -> Result<&Statement, ReportError> {
        lookup(&self.statements, "statement", id)
    }

    fn operand(&self, id: u64) -> Result<&Operand, ReportError> {
        lookup(&self.operands, "operand", id)
    }

    fn call_context(&self, id: u64) -> Result<&CallContext, ReportError> {
        lookup(&self.call_contexts, "call context", id)
    }

    fn memory_location(&self, id: u64) -> Result<&MemoryLocation, ReportError> {
        lookup(&self.memory_locations, "memory location", id)
    }

    fn scan_checks(&self) -> Box<dyn Iterator<Item = &Check> + '_> {
        Box::new(self.checks.iter())
    }

    fn files(&self) -> Box<dyn Iterator<Item = &File> + '_> {
        Box::new(self.files.values())
    }

    fn functions(&self) -> Box<dyn Iterator<Item = &Function> + '_> {
        Box::new(self.functions.values())
    }

    fn statements(&self) -> Box<dyn Iterator<Item = &Statement> + '_> {
        Box::new(self.statements.values())
    }

    fn operands(&self) -> Box<dyn Iterator<Item = &Operand> + '_> {
        Box::new(self.operands.values())
    }

    fn call_contexts(&self) -> Box<dyn Iterator<Item = &CallContext> + '_> {
        Box::new(self.call_contexts.values())
    }

    fn memory_locations(&self) -> Box<dyn Iterator<Item = &MemoryLocation> + '_> {
        Box::new(self.memory_locations.values())
    }

    fn timing_records(&self) -> &[TimingRecord] {
        &self.times
    }

    fn setting(&self, name: &str) -> Option<&serde_json::Value> {
        self.settings.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkreport_types::{RawCheck, StatementKind};

    fn raw(id: u64, statement_id: u64, call_context_id: u64) -> RawCheck {
        RawCheck {
            id,
            kind: CheckKind::Assert,
            checker: Checker::AssertionProver,
            status: Status::Ok,
            statement_id,
            call_context_id,
            operands: None,
            info: None,
        }
    }

    #[test]
    fn scan_is_ordered_by_statement_then_context() {
        let dump = StoreDump {
            checks: vec![raw(1, 9, 2), raw(2, 3, 5), raw(3, 9, 1), raw(4, 3, 5)],
            ..StoreDump::default()
        };
        let store = MemoryStore::from_dump(dump, "run.json").unwrap();
        let order: Vec<u64> = store.scan_checks().map(|c| c.id).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
    }

    #[test]
    fn dangling_id_is_unknown_id() {
        let store = MemoryStore::from_dump(StoreDump::default(), "run.json").unwrap();
        let err = store.call_context(42).unwrap_err();
        assert_eq!(err.to_string(), "no call context row with id 42");
    }

    #[test]
    fn duplicate_rows_are_rejected() {
        let statement = Statement {
            id: 1,
            kind: StatementKind::Load,
            function_id: 1,
            file_id: None,
            line: None,
            column: None,
        };
        let dump = StoreDump {
            statements: vec![statement.clone(), statement],
            ..StoreDump::default()
        };
        let err = MemoryStore::from_dump(dump, "run.json").unwrap_err();
        assert!(matches!(err, ReportError::DuplicateId { table: "statement", id: 1 }));
    }

    #[test]
    fn procedural_setting_defaults_to_interprocedural() {
        let mut dump = StoreDump::default();
        let store = MemoryStore::from_dump(dump.clone(), "run.json").unwrap();
        assert!(store.is_interprocedural());

        dump.settings.insert("procedural".into(), serde_json::json!("intraprocedural"));
        let store = MemoryStore::from_dump(dump, "run.json").unwrap();
        assert!(!store.is_interprocedural());
    }
}
