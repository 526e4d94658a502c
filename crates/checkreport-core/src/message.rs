//! Natural-language messages for report entries, one handler per check kind.

use std::collections::BTreeSet;

use checkreport_types::{
    BufferOverflowCheckKind, CheckKind, FunctionCallCheckKind, MemoryLocationKind, Operand,
    Status, ValueKind,
};

use crate::error::ReportError;
use crate::evidence::{BufferOverflowInfo, Evidence};
use crate::names::{memory_location, source_variable, statement_operand};
use crate::numeric::{Interval, Signedness};
use crate::report::StatementReport;
use crate::store::CheckStore;

/// Report verbosity, from 1 (short messages) to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(u8);

impl Verbosity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// Message for one report entry at the given verbosity.
pub fn generate_message(
    store: &dyn CheckStore,
    report: &StatementReport,
    verbosity: Verbosity,
) -> Result<String, ReportError> {
    let m = MessageContext {
        store,
        report,
        verbosity: verbosity.level(),
    };
    match report.kind {
        CheckKind::Unreachable => m.unreachable(),
        CheckKind::UnexpectedOperand => m.fixed(Status::Error, "unexpected operand"),
        CheckKind::UninitializedVariable => m.uninitialized_variable(),
        CheckKind::Assert => m.by_status(
            "assertion holds",
            "assertion could not be proven",
            "assertion never holds",
        ),
        CheckKind::DivisionByZero => m.division_by_zero(),
        CheckKind::ShiftCount => m.shift_count(),
        CheckKind::SignedIntUnderflow => m.integer_overflow(Signedness::Signed, "underflow"),
        CheckKind::SignedIntOverflow => m.integer_overflow(Signedness::Signed, "overflow"),
        CheckKind::UnsignedIntUnderflow => m.integer_overflow(Signedness::Unsigned, "underflow"),
        CheckKind::UnsignedIntOverflow => m.integer_overflow(Signedness::Unsigned, "overflow"),
        CheckKind::NullPointerDereference => m.null_pointer_dereference(),
        CheckKind::NullPointerComparison => m.null_pointer_comparison(),
        CheckKind::InvalidPointerComparison | CheckKind::InvalidPointerDereference => {
            m.expect_status(Status::Error)?;
            Ok(format!("pointer '{}' is invalid", m.operand_name()?))
        }
        CheckKind::PointerComparison => m.by_status(
            "safe pointer comparison",
            "comparison of pointers that might refer to different objects",
            "comparison of pointers referring to different objects",
        ),
        CheckKind::PointerOverflow => m.by_status(
            "safe pointer arithmetic",
            "pointer arithmetic might overflow",
            "pointer arithmetic overflow",
        ),
        CheckKind::UnknownMemoryAccess => {
            m.expect_status(Status::Warning)?;
            Ok(format!(
                "memory access might be invalid, could not infer information about pointer '{}'",
                m.operand_name()?
            ))
        }
        CheckKind::UnalignedPointer => m.unaligned_pointer(),
        CheckKind::BufferOverflowGets => m.fixed(Status::Error, "call to unsafe function 'gets'"),
        CheckKind::BufferOverflow => m.buffer_overflow(),
        CheckKind::IgnoredStore => m.ignored("ignored memory write"),
        CheckKind::IgnoredMemoryCopy => m.ignored("ignored memcpy()"),
        CheckKind::IgnoredMemoryMove => m.ignored("ignored memmove()"),
        CheckKind::IgnoredMemorySet => m.ignored("ignored memset()"),
        CheckKind::IgnoredFree => m.ignored("ignored memory deallocation"),
        CheckKind::IgnoredCallSideEffectOnPointerParameter => {
            let callee = m.callee_name()?;
            m.ignored(&format!("ignored side effect of call to function '{callee}'"))
        }
        CheckKind::IgnoredCallSideEffect => {
            m.expect_status(Status::Warning)?;
            Ok(format!(
                "ignored side effect of call to extern function '{}'. Analysis might be unsound.",
                m.callee_name()?
            ))
        }
        CheckKind::RecursiveFunctionCall => {
            m.expect_status(Status::Warning)?;
            Ok(format!(
                "function call to '{}' is recursive. Analysis might be unsound.",
                m.callee_name()?
            ))
        }
        CheckKind::FunctionCallInlineAssembly => {
            m.fixed(Status::Ok, "safe call to inline assembly code")
        }
        CheckKind::UnknownFunctionCallPointer => {
            m.expect_status(Status::Warning)?;
            Ok(format!(
                "function call might be unsafe, could not infer information about pointer '{}'",
                m.operand_name()?
            ))
        }
        CheckKind::FunctionCall => m.function_call(),
        CheckKind::Free => m.free(),
    }
}

/// Source name of a variable, or its raw representation when it has none.
fn display_name(repr: &str) -> &str {
    source_variable(repr).unwrap_or(repr)
}

/// Renders candidate lines as `\n\t* line` bullets.
fn bullets(lines: &[String]) -> String {
    lines.iter().map(|line| format!("\n\t* {line}")).collect()
}

/// ` item` for a single candidate, `:` followed by bullets otherwise.
fn one_or_list(lines: &[String]) -> String {
    match lines {
        [single] => format!(" {single}"),
        _ => format!(":{}", bullets(lines)),
    }
}

struct MessageContext<'a> {
    store: &'a dyn CheckStore,
    report: &'a StatementReport,
    verbosity: u8,
}

impl<'a> MessageContext<'a> {
    fn kind(&self) -> CheckKind {
        self.report.kind
    }

    fn status(&self) -> Status {
        self.report.status
    }

    fn unexpected(&self) -> ReportError {
        ReportError::UnexpectedStatus {
            kind: self.kind(),
            status: self.status(),
        }
    }

    fn expect_status(&self, expected: Status) -> Result<(), ReportError> {
        if self.status() == expected {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn malformed(&self, detail: impl Into<String>) -> ReportError {
        ReportError::MalformedEvidence {
            kind: self.kind(),
            detail: detail.into(),
        }
    }

    fn evidence(&self) -> &'a Evidence {
        &self.report.evidence
    }

    fn show_evidence(&self, interval: &Interval) -> bool {
        self.verbosity >= 2 || !interval.is_top()
    }

    fn fixed(&self, expected: Status, text: &str) -> Result<String, ReportError> {
        self.expect_status(expected)?;
        Ok(text.to_string())
    }

    fn by_status(&self, ok: &str, warning: &str, error: &str) -> Result<String, ReportError> {
        match self.status() {
            Status::Ok => Ok(ok.to_string()),
            Status::Warning => Ok(warning.to_string()),
            Status::Error => Ok(error.to_string()),
            Status::Unreachable => Err(self.unexpected()),
        }
    }

    /// Picks the hedged or definite wording; any other status is unexpected.
    fn hedge(&self, warning: &str, error: &str) -> Result<String, ReportError> {
        match self.status() {
            Status::Warning => Ok(warning.to_string()),
            Status::Error => Ok(error.to_string()),
            _ => Err(self.unexpected()),
        }
    }

    fn operand_at(&self, index: usize) -> Result<(u32, &'a Operand), ReportError> {
        let operand_ref = self
            .report
            .operands
            .get(index)
            .ok_or(ReportError::MissingOperand { kind: self.kind() })?;
        let operand = self.store.operand(operand_ref.operand_id())?;
        Ok((operand_ref.position(), operand))
    }

    fn operand(&self) -> Result<(u32, &'a Operand), ReportError> {
        self.operand_at(0)
    }

    fn operand_name(&self) -> Result<&'a str, ReportError> {
        let (_, operand) = self.operand()?;
        Ok(display_name(&operand.repr))
    }

    /// Positional role for constants, source name for variables.
    fn describe_operand(&self, position: u32, operand: &Operand, variable: impl Fn(&str) -> String) -> Result<String, ReportError> {
        if operand.kind.is_constant() {
            let statement = self.store.statement(self.report.statement_id)?;
            Ok(statement_operand(statement.kind, position))
        } else {
            Ok(variable(&operand.repr))
        }
    }

    fn callee_name(&self) -> Result<&'a str, ReportError> {
        let callee = self.evidence().callee(self.kind())?;
        Ok(self.store.function(callee.fun_id)?.pretty_name())
    }

    fn location_name(&self, id: u64) -> Result<String, ReportError> {
        memory_location(self.store, self.store.memory_location(id)?)
    }

    fn unreachable(&self) -> Result<String, ReportError> {
        match self.status() {
            Status::Ok => Ok("statement is reachable".to_string()),
            Status::Unreachable => Ok("code is dead".to_string()),
            _ => Err(self.unexpected()),
        }
    }

    fn uninitialized_variable(&self) -> Result<String, ReportError> {
        if self.status() == Status::Ok {
            return Ok("operand is well initialized".to_string());
        }
        let suffix = self.hedge(" might be uninitialized", " is uninitialized")?;
        let (position, operand) = self.operand()?;
        let subject = self.describe_operand(position, operand, |repr| match source_variable(repr) {
            Some(name) => format!("variable '{name}'"),
            None => format!("expression '{repr}'"),
        })?;
        Ok(subject + &suffix)
    }

    fn division_by_zero(&self) -> Result<String, ReportError> {
        match self.status() {
            Status::Ok => return Ok("divisor is not zero".to_string()),
            Status::Error => return Ok("division by zero".to_string()),
            Status::Warning => {}
            Status::Unreachable => return Err(self.unexpected()),
        }

        let (_, operand) = self.operand()?;
        let interval = self.evidence().interval(self.kind())?;
        let mut s = "divisor might be zero".to_string();
        if self.show_evidence(interval) {
            let name = source_variable(&operand.repr).unwrap_or("divisor");
            s += &format!(" ({})", interval.to_constraints(name));
        }
        Ok(s)
    }

    fn shift_count(&self) -> Result<String, ReportError> {
        if self.status() == Status::Ok {
            return Ok("shift count is valid".to_string());
        }
        let mut s = self.hedge("shift count might be invalid", "invalid shift count")?;

        let (_, operand) = self.operand()?;
        let interval = self.evidence().interval(self.kind())?;
        if self.show_evidence(interval) && operand.kind != ValueKind::IntegerConstant {
            let name = source_variable(&operand.repr).unwrap_or("count");
            s += &format!(" ({})", interval.to_constraints(name));
        }
        if self.verbosity >= 2 {
            s += &format!(
                "\nshift count is required to be between 0 and {}",
                interval.bit_width() - 1
            );
        }
        Ok(s)
    }

    fn integer_overflow(&self, signedness: Signedness, what: &str) -> Result<String, ReportError> {
        let sign = signedness.as_str();
        if self.status() == Status::Ok {
            return Ok(format!("safe from {sign} integer {what}"));
        }
        let mut s = self.hedge(
            &format!("possible {sign} integer {what}"),
            &format!("{sign} integer {what}"),
        )?;

        let (_, left) = self.operand_at(0)?;
        let (_, right) = self.operand_at(1)?;
        let info = self.evidence().int_overflow(self.kind())?;

        let mut constraints = Vec::new();
        for (operand, interval, fallback) in [(left, &info.left, "left"), (right, &info.right, "right")] {
            if self.show_evidence(interval) && operand.kind != ValueKind::IntegerConstant {
                let name = source_variable(&operand.repr).unwrap_or(fallback);
                constraints.push(interval.to_constraints(name));
            }
        }
        if !constraints.is_empty() {
            s += &format!(" ({})", constraints.join(", "));
        }
        if self.verbosity >= 2 {
            s += &format!(
                "\nbetween operands '{}' and '{}'",
                display_name(&left.repr),
                display_name(&right.repr)
            );
        }
        Ok(s)
    }

    fn null_pointer_dereference(&self) -> Result<String, ReportError> {
        if self.status() == Status::Ok {
            return Ok("pointer is non-null".to_string());
        }
        let suffix = self.hedge(" might be null", " is null")?;
        let (position, operand) = self.operand()?;
        let subject = self.describe_operand(position, operand, |repr| {
            format!("pointer '{}'", display_name(repr))
        })?;
        Ok(subject + &suffix)
    }

    fn null_pointer_comparison(&self) -> Result<String, ReportError> {
        self.expect_status(Status::Error)?;
        let (position, _) = self.operand()?;
        let side = if position == 0 { "left" } else { "right" };
        Ok(format!("invalid comparison with null as {side} operand"))
    }

    fn unaligned_pointer(&self) -> Result<String, ReportError> {
        if self.status() == Status::Ok {
            return Ok("memory access is well aligned".to_string());
        }
        let mut s = self.hedge("memory access might be unaligned", "memory access is unaligned")?;

        let info = self.evidence().alignment(self.kind())?;
        s += &format!(", access requires {} bytes alignment", info.requirement.a());
        if self.verbosity <= 1 {
            return Ok(s);
        }

        let offset = &info.offset;
        s += &if offset.is_top() {
            "\npointer offset is unknown".to_string()
        } else if offset.a() == 0 {
            format!("\npointer offset is {} bytes", offset.b())
        } else if offset.b() == 0 {
            format!("\npointer offset is a multiple of {} bytes", offset.a())
        } else {
            format!(
                "\npointer offset is equal to ({} modulo {}) bytes",
                offset.b(),
                offset.a()
            )
        };

        let mut points_to = Vec::new();
        for target in &info.points_to {
            let location = self.store.memory_location(target.id)?;
            if location.kind == MemoryLocationKind::AbsoluteZero {
                continue;
            }
            let mut line = memory_location(self.store, location)?;
            if let Some(congruence) = target.congruence.filter(|c| !c.is_top()) {
                line += &format!(" with alignment of {} bytes", congruence.a());
            }
            points_to.push(line);
        }
        points_to.sort();

        match points_to.as_slice() {
            [] => {}
            [single] => s += &format!("\npointer points to {single}"),
            many => s += &format!("\npointer points to:{}", bullets(many)),
        }
        Ok(s)
    }

    fn ignored(&self, head: &str) -> Result<String, ReportError> {
        self.expect_status(Status::Warning)?;
        Ok(format!(
            "{head}, could not infer information about pointer '{}'. Analysis might be unsound.",
            self.operand_name()?
        ))
    }

    fn required_interval(&self, value: Option<Interval>, field: &str) -> Result<Interval, ReportError> {
        value.ok_or_else(|| self.malformed(format!("missing field `{field}`")))
    }

    fn buffer_overflow(&self) -> Result<String, ReportError> {
        if self.status() == Status::Ok {
            return Ok("safe memory access".to_string());
        }

        let info = self.evidence().buffer_overflow(self.kind())?;
        let kinds: BTreeSet<BufferOverflowCheckKind> =
            info.points_to.iter().map(|t| t.kind).collect();
        let only = match kinds.len() {
            0 => return Err(self.malformed("empty points-to set")),
            1 => kinds.iter().next().copied(),
            _ => None,
        };

        let mut s = match only {
            None => self.hedge("memory access might be invalid", "invalid memory access")?,
            Some(BufferOverflowCheckKind::Function) => {
                self.expect_status(Status::Error)?;
                "dereferencing a function pointer".to_string()
            }
            Some(BufferOverflowCheckKind::UseAfterFree) => {
                self.hedge("possible use after free", "use after free")?
            }
            Some(BufferOverflowCheckKind::UseAfterReturn) => {
                self.hedge("possible use after return", "use after return")?
            }
            Some(BufferOverflowCheckKind::HardwareAddresses) => {
                let head = self.hedge("memory access might be invalid", "invalid memory access")?;
                return self.hardware_access(head, info);
            }
            Some(BufferOverflowCheckKind::OutOfBound) => {
                self.hedge("possible buffer overflow", "buffer overflow")?
            }
        };

        let element_size = info.array_element_size.filter(|&n| n != 0).map(i128::from);
        let points_to = self.buffer_targets(info, element_size)?;

        if let (Some(BufferOverflowCheckKind::OutOfBound), Some(element_size)) = (only, element_size) {
            let offset = self
                .required_interval(info.offset, "offset")?
                .sign_cast(Signedness::Signed);
            s += &if let Some(n) = offset.singleton() {
                format!(", accessing index {}", n.value().div_euclid(element_size))
            } else if !offset.ub().is_max() {
                let ub = offset.ub().value().div_euclid(element_size);
                if !offset.lb().is_min() {
                    let lb = offset.lb().value().div_euclid(element_size);
                    format!(", accessing index between {lb} and {ub}")
                } else {
                    format!(", accessing index up to {ub}")
                }
            } else {
                ", could not bound index for access".to_string()
            };
            s += &match points_to.as_slice() {
                [single] => format!(" of {single}"),
                many => format!(" of:{}", bullets(many)),
            };
            return Ok(s);
        }

        s += &format!(", pointer '{}'", self.operand_name()?);
        let mut points_to_prep = " points to";

        if kinds.contains(&BufferOverflowCheckKind::OutOfBound) {
            let mut offset_prep = " at";
            points_to_prep = " of";

            let access_size = self.required_interval(info.access_size, "access_size")?;
            if let Some(n) = access_size.singleton() {
                s += &format!(" accesses {n} bytes");
            } else if !access_size.ub().is_max() {
                if !access_size.lb().is_min() {
                    s += &format!(
                        " accesses between {} and {} bytes",
                        access_size.lb(),
                        access_size.ub()
                    );
                } else {
                    s += &format!(" accesses up to {} bytes", access_size.ub());
                }
            } else {
                offset_prep = " with";
                points_to_prep = " points to";
            }

            let offset = self
                .required_interval(info.offset, "offset")?
                .sign_cast(Signedness::Signed);
            if let Some(n) = offset.singleton() {
                s += &format!("{offset_prep} offset {n} bytes");
            } else if !offset.ub().is_max() {
                if !offset.lb().is_min() {
                    s += &format!(
                        "{offset_prep} offset between {} and {} bytes",
                        offset.lb(),
                        offset.ub()
                    );
                } else {
                    s += &format!("{offset_prep} offset up to {} bytes", offset.ub());
                }
            }
        }

        s += points_to_prep;
        s += &one_or_list(&points_to);
        Ok(s)
    }

    fn hardware_access(&self, mut s: String, info: &BufferOverflowInfo) -> Result<String, ReportError> {
        let access_size = self.required_interval(info.access_size, "access_size")?;
        let offset = self.required_interval(info.offset, "offset")?;

        if access_size.ub().is_max() {
            return Ok(s + ", could not bound access size");
        }
        if offset.ub().is_max() {
            return Ok(s + ", could not bound offset");
        }

        s += &if let Some(n) = access_size.singleton() {
            format!(", accessing {n} bytes")
        } else if !access_size.lb().is_min() {
            format!(
                ", accessing between {} and {} bytes",
                access_size.lb(),
                access_size.ub()
            )
        } else {
            format!(", accessing up to {} bytes", access_size.ub())
        };

        s += &if let Some(n) = offset.singleton() {
            format!(" at address 0x{:x}", n.value())
        } else {
            format!(
                " at address between 0x{:x} and 0x{:x}",
                offset.lb().value(),
                offset.ub().value()
            )
        };
        Ok(s)
    }

    /// One sorted line per points-to target. A single target needs no
    /// per-target verdict.
    fn buffer_targets(
        &self,
        info: &BufferOverflowInfo,
        element_size: Option<i128>,
    ) -> Result<Vec<String>, ReportError> {
        let mut lines = Vec::new();
        for target in &info.points_to {
            let mut line = self.location_name(target.id)?;

            if target.kind == BufferOverflowCheckKind::OutOfBound {
                let size = self.required_interval(target.size, "size")?;
                match element_size {
                    Some(element_size) => {
                        if let Some(n) = size.singleton() {
                            line += &format!(" of {} elements", n.value().div_euclid(element_size));
                        } else if !size.ub().is_max() {
                            line += &format!(
                                " of at most {} elements",
                                size.ub().value().div_euclid(element_size)
                            );
                        }
                    }
                    None => {
                        if let Some(n) = size.singleton() {
                            line += &format!(" of size {n} bytes");
                        } else if !size.ub().is_max() {
                            line += &format!(" of size at most {} bytes", size.ub());
                        }
                    }
                }
            }

            if info.points_to.len() == 1 {
                lines.push(line);
                break;
            }

            let verdict = match (target.kind, target.status) {
                (BufferOverflowCheckKind::Function, Status::Error) => ", which is a function",
                (BufferOverflowCheckKind::UseAfterFree, Status::Warning) => ", which might be released",
                (BufferOverflowCheckKind::UseAfterFree, Status::Error) => ", which is released",
                (BufferOverflowCheckKind::UseAfterReturn, Status::Warning) => {
                    ", which might be out of scope"
                }
                (BufferOverflowCheckKind::UseAfterReturn, Status::Error) => ", which is out of scope",
                (BufferOverflowCheckKind::HardwareAddresses, Status::Warning) => {
                    ", which might not be a valid hardware address"
                }
                (BufferOverflowCheckKind::HardwareAddresses, Status::Error) => {
                    ", which is an invalid hardware address"
                }
                (BufferOverflowCheckKind::OutOfBound, Status::Ok) => ", which is valid",
                (BufferOverflowCheckKind::OutOfBound, Status::Warning) => {
                    ", which might be out of bounds"
                }
                (BufferOverflowCheckKind::OutOfBound, Status::Error) => ", which is out of bounds",
                (_, status) => {
                    return Err(ReportError::UnexpectedStatus {
                        kind: self.kind(),
                        status,
                    })
                }
            };
            line += verdict;
            lines.push(line);
        }
        lines.sort();
        Ok(lines)
    }

    fn function_call(&self) -> Result<String, ReportError> {
        let info = self.evidence().function_call(self.kind())?;
        let missing = |field: &str| self.malformed(format!("missing field `{field}`"));

        if self.status() == Status::Ok {
            let mut callees = Vec::new();
            for target in &info.points_to {
                let fun_id = target.fun_id.ok_or_else(|| missing("fun_id"))?;
                callees.push(format!("'{}'", self.store.function(fun_id)?.pretty_name()));
            }
            callees.sort();
            return Ok(match callees.as_slice() {
                [single] => format!("safe function call to {single}"),
                many => format!("safe function call, called functions are:{}", bullets(many)),
            });
        }

        let mut s = self.hedge("function call might be invalid", "invalid function call")?;
        s += &format!(", pointer '{}' points to", self.operand_name()?);

        let mut callees = Vec::new();
        for target in &info.points_to {
            let kind = target.kind.ok_or_else(|| missing("kind"))?;
            let line = match kind {
                FunctionCallCheckKind::NotFunction => {
                    let id = target.id.ok_or_else(|| missing("id"))?;
                    format!("{}, which is not a function", self.location_name(id)?)
                }
                FunctionCallCheckKind::WrongSignature | FunctionCallCheckKind::Ok => {
                    let fun_id = target.fun_id.ok_or_else(|| missing("fun_id"))?;
                    let name = self.store.function(fun_id)?.pretty_name();
                    let verdict = if kind == FunctionCallCheckKind::Ok {
                        "which is valid"
                    } else {
                        "which has a mismatching type"
                    };
                    format!("function '{name}', {verdict}")
                }
            };
            callees.push(line);
        }
        callees.sort();
        s += &one_or_list(&callees);
        Ok(s)
    }

    fn free(&self) -> Result<String, ReportError> {
        if self.status() == Status::Ok {
            return Ok("safe memory deallocation".to_string());
        }

        let info = self.evidence().free(self.kind())?;
        let mut points_to = Vec::new();
        let mut all_dynamic = true;
        for target in &info.points_to {
            let location = self.store.memory_location(target.id)?;
            let mut line = memory_location(self.store, location)?;
            line += if location.kind != MemoryLocationKind::DynAlloc {
                all_dynamic = false;
                ", which is not dynamically allocated"
            } else {
                match target.status {
                    Status::Error => ", which is already released",
                    Status::Warning => ", which might be already released",
                    Status::Ok => ", which is valid",
                    status => {
                        return Err(ReportError::UnexpectedStatus {
                            kind: self.kind(),
                            status,
                        })
                    }
                }
            };
            points_to.push(line);
        }
        points_to.sort();

        let mut s = if all_dynamic {
            self.hedge("possible double free", "double free")?
        } else {
            self.hedge("memory deallocation might be invalid", "invalid memory deallocation")?
        };
        s += &format!(", pointer '{}' points to", self.operand_name()?);
        s += &one_or_list(&points_to);
        Ok(s)
    }
}
