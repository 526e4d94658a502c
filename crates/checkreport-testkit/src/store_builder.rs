//! Fluent builder for store dumps.
//!
//! Rows are added in any order; `build` sorts nothing and validates nothing,
//! so a test can construct dangling references or duplicates on purpose.
//!
//! # Example
//!
//! ```rust
//! use checkreport_testkit::store_builder::StoreBuilder;
//! use checkreport_types::{CheckKind, Status};
//!
//! let dump = StoreBuilder::new()
//!     .file(1, "src/main.c")
//!     .function(1, "main", Some(1))
//!     .statement(10, 1, Some(1), 4, 9)
//!     .operand(1, checkreport_types::ValueKind::LocalVariable, "p")
//!     .root_context(1, 1)
//!     .check(10, 1, CheckKind::NullPointerDereference, Status::Error)
//!     .operands(&[(0, 1)])
//!     .build();
//!
//! assert_eq!(dump.checks.len(), 1);
//! ```

use checkreport_types::{
    CallContext, CheckKind, Checker, File, Function, MemoryLocation, MemoryLocationInfo,
    MemoryLocationKind, Operand, OperandRef, RawCheck, Statement, StatementKind, Status,
    StoreDump, TimingRecord, ValueKind,
};

/// A builder for [`StoreDump`] values.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    dump: StoreDump,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, id: u64, path: &str) -> Self {
        self.dump.files.push(File {
            id,
            path: path.to_string(),
        });
        self
    }

    pub fn function(mut self, id: u64, name: &str, file_id: Option<u64>) -> Self {
        self.dump.functions.push(Function {
            id,
            name: name.to_string(),
            demangled: None,
            definition: true,
            file_id,
            line: None,
        });
        self
    }

    /// Sets the demangled name of the most recently added function.
    pub fn demangled(mut self, name: &str) -> Self {
        if let Some(function) = self.dump.functions.last_mut() {
            function.demangled = Some(name.to_string());
        }
        self
    }

    /// Adds a load statement at `line:column`.
    pub fn statement(
        self,
        id: u64,
        function_id: u64,
        file_id: Option<u64>,
        line: u32,
        column: u32,
    ) -> Self {
        self.statement_row(Statement {
            id,
            kind: StatementKind::Load,
            function_id,
            file_id,
            line: Some(line),
            column: Some(column),
        })
    }

    /// Adds a call statement at `line:column`.
    pub fn call_statement(
        self,
        id: u64,
        function_id: u64,
        file_id: Option<u64>,
        line: u32,
        column: u32,
    ) -> Self {
        self.statement_row(Statement {
            id,
            kind: StatementKind::Call,
            function_id,
            file_id,
            line: Some(line),
            column: Some(column),
        })
    }

    /// Adds a statement with no source location.
    pub fn synthetic_statement(self, id: u64, function_id: u64) -> Self {
        self.statement_row(Statement {
            id,
            kind: StatementKind::Assignment,
            function_id,
            file_id: None,
            line: None,
            column: None,
        })
    }

    pub fn statement_row(mut self, statement: Statement) -> Self {
        self.dump.statements.push(statement);
        self
    }

    pub fn operand(mut self, id: u64, kind: ValueKind, repr: &str) -> Self {
        self.dump.operands.push(Operand {
            id,
            kind,
            repr: repr.to_string(),
        });
        self
    }

    /// Adds the entry-point context of `function_id`.
    pub fn root_context(mut self, id: u64, function_id: u64) -> Self {
        self.dump.call_contexts.push(CallContext {
            id,
            call_id: None,
            function_id: Some(function_id),
            parent_id: None,
        });
        self
    }

    /// Adds a context entered through call statement `call_id`, which lives
    /// in `function_id`.
    pub fn call_context(mut self, id: u64, call_id: u64, function_id: u64, parent_id: u64) -> Self {
        self.dump.call_contexts.push(CallContext {
            id,
            call_id: Some(call_id),
            function_id: Some(function_id),
            parent_id: Some(parent_id),
        });
        self
    }

    pub fn memory_location(
        mut self,
        id: u64,
        kind: MemoryLocationKind,
        info: Option<MemoryLocationInfo>,
    ) -> Self {
        self.dump
            .memory_locations
            .push(MemoryLocation { id, kind, info });
        self
    }

    /// Adds a check with the next free id and the checker that normally
    /// produces `kind`.
    pub fn check(self, statement_id: u64, call_context_id: u64, kind: CheckKind, status: Status) -> Self {
        self.check_by(statement_id, call_context_id, kind, kind.checker(), status)
    }

    pub fn check_by(
        mut self,
        statement_id: u64,
        call_context_id: u64,
        kind: CheckKind,
        checker: Checker,
        status: Status,
    ) -> Self {
        let id = self.dump.checks.iter().map(|c| c.id).max().map_or(1, |m| m + 1);
        self.dump.checks.push(RawCheck {
            id,
            kind,
            checker,
            status,
            statement_id,
            call_context_id,
            operands: None,
            info: None,
        });
        self
    }

    /// Sets the operands of the most recently added check.
    pub fn operands(mut self, operands: &[(u32, u64)]) -> Self {
        if let Some(check) = self.dump.checks.last_mut() {
            check.operands = Some(operands.iter().map(|&(p, id)| OperandRef(p, id)).collect());
        }
        self
    }

    /// Sets the evidence payload of the most recently added check.
    pub fn info(mut self, info: serde_json::Value) -> Self {
        if let Some(check) = self.dump.checks.last_mut() {
            check.info = Some(info);
        }
        self
    }

    pub fn timing(mut self, pass: &str, seconds: f64) -> Self {
        self.dump.times.push(TimingRecord {
            pass: pass.to_string(),
            seconds,
        });
        self
    }

    pub fn setting(mut self, name: &str, value: serde_json::Value) -> Self {
        self.dump.settings.insert(name.to_string(), value);
        self
    }

    pub fn build(self) -> StoreDump {
        self.dump
    }

    /// The dump as pretty JSON, ready to be written to a store file.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.dump).expect("store dump should serialize")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_ids_are_sequential() {
        let dump = StoreBuilder::new()
            .check(1, 1, CheckKind::Assert, Status::Ok)
            .check(1, 1, CheckKind::Assert, Status::Error)
            .build();
        let ids: Vec<u64> = dump.checks.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn operands_and_info_apply_to_last_check() {
        let dump = StoreBuilder::new()
            .check(1, 1, CheckKind::Assert, Status::Ok)
            .check(2, 1, CheckKind::DivisionByZero, Status::Warning)
            .operands(&[(1, 4)])
            .info(serde_json::json!({"type": "s32", "lb": -5, "ub": 5}))
            .build();
        assert!(dump.checks[0].operands.is_none());
        assert_eq!(dump.checks[1].operands, Some(vec![OperandRef(1, 4)]));
        assert!(dump.checks[1].info.is_some());
    }

    #[test]
    fn check_uses_the_kinds_checker() {
        let dump = StoreBuilder::new()
            .check(1, 1, CheckKind::Free, Status::Ok)
            .build();
        assert_eq!(dump.checks[0].checker, Checker::DoubleFree);
    }

    #[test]
    fn json_round_trips() {
        let builder = StoreBuilder::new().file(1, "a.c").function(1, "main", Some(1));
        let back: StoreDump = serde_json::from_str(&builder.to_json()).unwrap();
        assert_eq!(back, builder.build());
    }
}
