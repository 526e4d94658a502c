//! Human-readable names for operands, memory locations and call contexts.

use std::sync::OnceLock;

use checkreport_types::{CallContext, MemoryLocation, MemoryLocationKind, StatementKind};
use regex::Regex;

use crate::error::ReportError;
use crate::store::CheckStore;

/// Names the compiler gives to temporaries, e.g. `f.add3` or `f.arrayidx`.
const LLVM_TEMPORARY_NAMES: &[&str] = &[
    "add",
    "sub",
    "div",
    "mul",
    "inc",
    "dec",
    "incdec",
    "rem",
    "shl",
    "shr",
    "and",
    "or",
    "land",
    "xor",
    "neg",
    "cmp",
    "conv",
    "cond",
    "bf",
    "retval",
    "tobool",
    "Pivot",
    "SwitchLeaf",
    "PHILowerSelect",
    "phitmp",
    "arrayidx",
    "arraydecay",
    "idx",
    "idxprom",
    "vaarg",
    "vla",
    "vfn",
    "call",
    "gp_offset",
    "gp_offset_p",
    "fits_in_gp",
    "fp_offset",
    "fp_offset_p",
    "fits_in_fp",
    "reg_save_area",
    "reg_save_area_p",
    "overflow_arg_area",
    "overflow_arg_area_p",
    "__value_",
];

struct SyntheticPatterns {
    analyzer_temporary: Regex,
    llvm_temporary: Regex,
    shadow: Regex,
}

fn synthetic_patterns() -> &'static SyntheticPatterns {
    static PATTERNS: OnceLock<SyntheticPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| SyntheticPatterns {
        analyzer_temporary: Regex::new(r"^__v:(init-gv-)?\d+$")
            .expect("temporary name regex should compile"),
        llvm_temporary: Regex::new(r"^[^.]+\._\d+$").expect("temporary name regex should compile"),
        shadow: Regex::new(r"^shadow\.").expect("shadow name regex should compile"),
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Source-level variable name behind an operand's printed form, if any.
///
/// Dot-less names are globals and name themselves; `<function>.<name>` names
/// a local. Temporaries introduced while lowering are not derivable.
pub fn source_variable(repr: &str) -> Option<&str> {
    let patterns = synthetic_patterns();
    if repr.is_empty()
        || repr.starts_with('.')
        || patterns.analyzer_temporary.is_match(repr)
        || patterns.llvm_temporary.is_match(repr)
        || patterns.shadow.is_match(repr)
    {
        return None;
    }

    let name = match repr.split('.').nth(1) {
        None => repr,
        Some(local) => {
            let base = local.trim_end_matches(|c: char| c.is_ascii_digit());
            if LLVM_TEMPORARY_NAMES.contains(&base) {
                return None;
            }
            base
        }
    };
    is_identifier(name).then_some(name)
}

pub fn ordinal(num: u32) -> String {
    match num {
        1 => return "first".to_string(),
        2 => return "second".to_string(),
        3 => return "third".to_string(),
        _ => {}
    }
    let suffix = match (num % 100, num % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{num}{suffix}")
}

/// Role of the `position`-th operand of a statement.
pub fn statement_operand(kind: StatementKind, position: u32) -> String {
    match kind {
        StatementKind::Assignment | StatementKind::UnaryOperation => "right hand side".to_string(),
        StatementKind::BinaryOperation | StatementKind::Comparison => {
            if position == 0 {
                "left operand".to_string()
            } else {
                "right operand".to_string()
            }
        }
        StatementKind::Return => "returned value".to_string(),
        StatementKind::Allocate => "size operand".to_string(),
        StatementKind::PointerShift => {
            if position == 0 {
                "base operand".to_string()
            } else {
                format!("{} operand", ordinal(position))
            }
        }
        StatementKind::Load => "pointer".to_string(),
        StatementKind::Store => {
            if position == 0 {
                "pointer".to_string()
            } else {
                "stored value".to_string()
            }
        }
        StatementKind::ExtractElement | StatementKind::InsertElement => {
            format!("{} operand", ordinal(position + 1))
        }
        StatementKind::Call | StatementKind::Invoke => {
            if position == 0 {
                "function pointer".to_string()
            } else {
                format!("{} argument", ordinal(position))
            }
        }
        StatementKind::LandingPad | StatementKind::Resume | StatementKind::Unreachable => {
            "operand".to_string()
        }
    }
}

pub fn memory_location(
    store: &dyn CheckStore,
    location: &MemoryLocation,
) -> Result<String, ReportError> {
    let info = location.info.clone().unwrap_or_default();
    let text = match location.kind {
        MemoryLocationKind::Local => match info.name {
            Some(name) => format!("local variable '{name}'"),
            None => "unnamed local variable".to_string(),
        },
        MemoryLocationKind::Global => {
            if let Some(name) = info.demangle.or(info.name) {
                format!("global variable '{name}'")
            } else if let Some(cst) = info.cst {
                format!("constant {cst}")
            } else {
                "unnamed global variable".to_string()
            }
        }
        MemoryLocationKind::Function => {
            let id = info.id.ok_or(ReportError::MissingField {
                table: "memory location",
                id: location.id,
                field: "id",
            })?;
            format!("function '{}'", store.function(id)?.pretty_name())
        }
        MemoryLocationKind::Aggregate => "aggregate variable".to_string(),
        MemoryLocationKind::AbsoluteZero => "zero".to_string(),
        MemoryLocationKind::Argv => "'argv'".to_string(),
        MemoryLocationKind::LibcErrno => "'errno'".to_string(),
        MemoryLocationKind::DynAlloc => {
            let id = info.call_id.ok_or(ReportError::MissingField {
                table: "memory location",
                id: location.id,
                field: "call_id",
            })?;
            let call = store.statement(id)?;
            let function = store.function(call.function_id)?;
            match (call.line, call.column) {
                (Some(line), Some(column)) => format!(
                    "dynamic memory allocated at '{}:{line}:{column}'",
                    function.pretty_name()
                ),
                _ => format!("dynamic memory allocated in '{}'", function.pretty_name()),
            }
        }
    };
    Ok(text)
}

/// Walks a call context up to its entry point, returning the chain from the
/// entry point down (the root first).
pub fn call_chain<'s>(
    store: &'s dyn CheckStore,
    context: &'s CallContext,
) -> Result<Vec<&'s CallContext>, ReportError> {
    let mut chain = Vec::new();
    let mut current = context;
    while !current.is_root() {
        chain.push(current);
        if chain.len() > MAX_CALL_CHAIN {
            return Err(ReportError::CyclicCallContext { id: context.id });
        }
        let parent_id = current.parent_id.ok_or(ReportError::MissingField {
            table: "call context",
            id: current.id,
            field: "parent_id",
        })?;
        current = store.call_context(parent_id)?;
    }
    chain.push(current);
    chain.reverse();
    Ok(chain)
}

const MAX_CALL_CHAIN: usize = 1 << 16;

/// Renders a call context as `./f@line:col:call/g@line:col:call`.
pub fn call_context_path(store: &dyn CheckStore, context: &CallContext) -> Result<String, ReportError> {
    let mut parts = vec![".".to_string()];
    for frame in call_chain(store, context)? {
        let Some(call_id) = frame.call_id else {
            continue;
        };
        let function_id = frame.function_id.ok_or(ReportError::MissingField {
            table: "call context",
            id: frame.id,
            field: "function_id",
        })?;
        let function = store.function(function_id)?;
        let call = store.statement(call_id)?;
        parts.push(format!(
            "{}@{}:{}:{call_id}",
            function.pretty_name(),
            call.line.map_or_else(|| "?".to_string(), |l| l.to_string()),
            call.column.map_or_else(|| "?".to_string(), |c| c.to_string()),
        ));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_variable_filters_synthetic_names() {
        assert_eq!(source_variable("x"), Some("x"));
        assert_eq!(source_variable("main.count"), Some("count"));
        assert_eq!(source_variable("main.i2"), Some("i"));
        assert_eq!(source_variable("__v:12"), None);
        assert_eq!(source_variable("__v:init-gv-3"), None);
        assert_eq!(source_variable("main._4"), None);
        assert_eq!(source_variable("shadow.errno"), None);
        assert_eq!(source_variable(".str"), None);
        assert_eq!(source_variable("main.add5"), None);
        assert_eq!(source_variable("main.arrayidx"), None);
        assert_eq!(source_variable("%3"), None);
        assert_eq!(source_variable(""), None);
    }

    #[test]
    fn ordinals_handle_teens() {
        let got: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 101, 111, 112].map(ordinal).to_vec();
        assert_eq!(
            got,
            vec![
                "first", "second", "third", "4th", "11th", "12th", "13th", "21st", "22nd",
                "23rd", "101st", "111th", "112th"
            ]
        );
    }

    #[test]
    fn operand_roles_follow_statement_kind() {
        assert_eq!(statement_operand(StatementKind::Assignment, 0), "right hand side");
        assert_eq!(statement_operand(StatementKind::BinaryOperation, 1), "right operand");
        assert_eq!(statement_operand(StatementKind::Call, 0), "function pointer");
        assert_eq!(statement_operand(StatementKind::Call, 2), "second argument");
        assert_eq!(statement_operand(StatementKind::PointerShift, 1), "first operand");
        assert_eq!(statement_operand(StatementKind::ExtractElement, 0), "first operand");
        assert_eq!(statement_operand(StatementKind::Store, 1), "stored value");
    }
}
