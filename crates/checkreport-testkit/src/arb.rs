//! Proptest strategies for generating valid test inputs.
//!
//! Stores are generated constructively so that every reference resolves and
//! every check can be turned into a message: each check kind carries only the
//! statuses its checker emits, the operands its message reads, and an
//! evidence payload whose ids point at rows of the generated store.
//!
//! # Bounds
//!
//! To keep tests fast, the following bounds are enforced:
//! - Max statements per store: 6
//! - Max calling contexts per store: 4
//! - Max checks per store: 40

use checkreport_types::{
    CheckKind, Checker, Defaults, MemoryLocationInfo, MemoryLocationKind, OperandRef, RawCheck,
    ReportFormat, Status, StoreDump, ValueKind,
};
use proptest::prelude::*;
use serde_json::{json, Value};

use crate::store_builder::StoreBuilder;

// =============================================================================
// Constants for bounding generated data
// =============================================================================

/// Maximum number of statements in a generated store.
pub const MAX_STATEMENTS: u64 = 6;

/// Maximum number of calling contexts in a generated store.
pub const MAX_CONTEXTS: u64 = 4;

/// Maximum number of checks in a generated store.
pub const MAX_CHECKS: usize = 40;

// =============================================================================
// Enum Strategies
// =============================================================================

/// Strategy for generating Status values.
pub fn arb_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL)
}

/// Strategy for generating CheckKind values.
pub fn arb_check_kind() -> impl Strategy<Value = CheckKind> {
    prop::sample::select(CheckKind::ALL)
}

/// Strategy for generating Checker values.
pub fn arb_checker() -> impl Strategy<Value = Checker> {
    prop::sample::select(Checker::ALL)
}

/// Strategy for generating ReportFormat values.
pub fn arb_report_format() -> impl Strategy<Value = ReportFormat> {
    prop_oneof![
        Just(ReportFormat::Text),
        Just(ReportFormat::Json),
        Just(ReportFormat::Sarif),
        Just(ReportFormat::Csv),
        Just(ReportFormat::Junit),
        Just(ReportFormat::Auto),
        Just(ReportFormat::No),
    ]
}

// =============================================================================
// Filter Strategies
// =============================================================================

/// Strategy for generating `--status-filter` expressions.
pub fn arb_status_filter() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        prop::sample::subsequence(vec!["ok", "warning", "error", "unreachable"], 1..=4)
            .prop_map(|names| names.join(",")),
    ]
}

/// Strategy for generating `--analyses-filter` expressions.
pub fn arb_analyses_filter() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("*".to_string()),
        prop::sample::subsequence(Checker::ALL.to_vec(), 1..=4).prop_map(|checkers| {
            checkers
                .iter()
                .map(|c| c.short_name())
                .collect::<Vec<_>>()
                .join(",")
        }),
    ]
}

// =============================================================================
// Check Strategies
// =============================================================================

/// A check kind paired with a status its checker can emit, the operands
/// its message needs and its evidence payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckSpec {
    pub kind: CheckKind,
    pub status: Status,
    pub operands: Vec<OperandRef>,
    pub info: Option<Value>,
}

/// Operand ids of the generated store.
const POINTERS: [u64; 2] = [1, 2];
const CONSTANT_ONE: u64 = 3;

/// Memory location ids of the generated store.
const LOCAL_BUF: u64 = 1;
const HEAP: u64 = 2;
const GLOBAL_TABLE: u64 = 3;

/// Function id of the external callee of the generated store.
const CALLEE: u64 = 2;

/// Statuses the checker of `kind` emits.
pub fn statuses_for(kind: CheckKind) -> &'static [Status] {
    match kind {
        CheckKind::Unreachable => &[Status::Ok, Status::Unreachable],
        CheckKind::UnexpectedOperand
        | CheckKind::BufferOverflowGets
        | CheckKind::NullPointerComparison
        | CheckKind::InvalidPointerComparison
        | CheckKind::InvalidPointerDereference => &[Status::Error],
        CheckKind::UnknownMemoryAccess
        | CheckKind::UnknownFunctionCallPointer
        | CheckKind::IgnoredStore
        | CheckKind::IgnoredMemoryCopy
        | CheckKind::IgnoredMemoryMove
        | CheckKind::IgnoredMemorySet
        | CheckKind::IgnoredFree
        | CheckKind::IgnoredCallSideEffectOnPointerParameter
        | CheckKind::IgnoredCallSideEffect
        | CheckKind::RecursiveFunctionCall => &[Status::Warning],
        CheckKind::FunctionCallInlineAssembly => &[Status::Ok],
        _ => &[Status::Ok, Status::Warning, Status::Error],
    }
}

/// Strategy for a signed 32-bit interval payload.
pub fn arb_interval() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (-100i64..100, 0i64..50).prop_map(|(lb, width)| {
            json!({"type": "s32", "lb": lb, "ub": lb + width})
        }),
        1 => Just(json!({"type": "s32", "lb": i32::MIN, "ub": i32::MAX})),
    ]
}

/// Random choices an evidence payload is built from.
#[derive(Debug, Clone)]
struct EvidenceSeed {
    interval: Value,
    target_status: Status,
    buffer_kind: u8,
    two_targets: bool,
    call_kind: u8,
}

fn arb_evidence_seed() -> impl Strategy<Value = EvidenceSeed> {
    (
        arb_interval(),
        prop::sample::select(vec![Status::Ok, Status::Warning, Status::Error]),
        prop::sample::select(vec![1u8, 2, 3, 4]),
        any::<bool>(),
        0u8..=2,
    )
        .prop_map(|(interval, target_status, buffer_kind, two_targets, call_kind)| EvidenceSeed {
            interval,
            target_status,
            buffer_kind,
            two_targets,
            call_kind,
        })
}

/// Builds the operands and evidence of a check of `kind`.
fn shape(kind: CheckKind, pointer: u64, seed: EvidenceSeed) -> (Vec<OperandRef>, Option<Value>) {
    let on_pointer = vec![OperandRef(0, pointer)];
    match kind {
        CheckKind::DivisionByZero | CheckKind::ShiftCount => {
            (vec![OperandRef(1, pointer)], Some(seed.interval))
        }
        CheckKind::SignedIntUnderflow
        | CheckKind::SignedIntOverflow
        | CheckKind::UnsignedIntUnderflow
        | CheckKind::UnsignedIntOverflow => (
            vec![OperandRef(0, pointer), OperandRef(1, CONSTANT_ONE)],
            Some(json!({
                "left": seed.interval,
                "right": {"type": "s32", "lb": 1, "ub": 1}
            })),
        ),
        CheckKind::NullPointerComparison => (vec![OperandRef(1, pointer)], None),
        CheckKind::UnalignedPointer => (
            on_pointer,
            Some(json!({
                "requirement": {"type": "u64", "a": 4, "b": 0},
                "offset": {"type": "u64", "a": 2, "b": 0},
                "points_to": [{"id": LOCAL_BUF, "congruence": {"type": "u64", "a": 2, "b": 0}}]
            })),
        ),
        CheckKind::BufferOverflow => {
            let size = json!({"type": "u64", "lb": 16, "ub": 16});
            let element_size = if seed.two_targets { 4 } else { 0 };
            let points_to = match seed.buffer_kind {
                4 if seed.two_targets => json!([
                    {"kind": 4, "status": seed.target_status.code(), "id": LOCAL_BUF, "size": size},
                    {"kind": 4, "status": 1, "id": GLOBAL_TABLE, "size": size}
                ]),
                4 => json!([{"kind": 4, "status": 2, "id": GLOBAL_TABLE, "size": size}]),
                other => json!([{"kind": other, "status": 2, "id": HEAP}]),
            };
            (
                on_pointer,
                Some(json!({
                    "points_to": points_to,
                    "access_size": {"type": "u64", "lb": 4, "ub": 4},
                    "offset": {"type": "u64", "lb": 0, "ub": 24},
                    "array_element_size": element_size
                })),
            )
        }
        CheckKind::IgnoredCallSideEffectOnPointerParameter => {
            (on_pointer, Some(json!({"fun_id": CALLEE})))
        }
        CheckKind::IgnoredCallSideEffect | CheckKind::RecursiveFunctionCall => {
            (vec![], Some(json!({"fun_id": CALLEE})))
        }
        CheckKind::FunctionCall => (
            on_pointer,
            Some(json!({
                "points_to": [{"kind": seed.call_kind, "id": GLOBAL_TABLE, "fun_id": CALLEE}]
            })),
        ),
        CheckKind::Free => {
            let id = if seed.two_targets { LOCAL_BUF } else { HEAP };
            (
                on_pointer,
                Some(json!({"points_to": [{"id": id, "status": seed.target_status.code()}]})),
            )
        }
        CheckKind::Unreachable
        | CheckKind::UnexpectedOperand
        | CheckKind::Assert
        | CheckKind::PointerComparison
        | CheckKind::PointerOverflow
        | CheckKind::BufferOverflowGets
        | CheckKind::FunctionCallInlineAssembly => (vec![], None),
        CheckKind::UninitializedVariable
        | CheckKind::NullPointerDereference
        | CheckKind::InvalidPointerComparison
        | CheckKind::InvalidPointerDereference
        | CheckKind::UnknownMemoryAccess
        | CheckKind::UnknownFunctionCallPointer
        | CheckKind::IgnoredStore
        | CheckKind::IgnoredMemoryCopy
        | CheckKind::IgnoredMemoryMove
        | CheckKind::IgnoredMemorySet
        | CheckKind::IgnoredFree => (on_pointer, None),
    }
}

/// Strategy for checks of every kind, each with a status its checker emits.
pub fn arb_check_spec() -> impl Strategy<Value = CheckSpec> {
    arb_check_kind().prop_flat_map(|kind| {
        (
            prop::sample::select(statuses_for(kind)),
            prop::sample::select(POINTERS.to_vec()),
            arb_evidence_seed(),
        )
            .prop_map(move |(status, pointer, seed)| {
                let (operands, info) = shape(kind, pointer, seed);
                CheckSpec {
                    kind,
                    status,
                    operands,
                    info,
                }
            })
    })
}

// =============================================================================
// Store Strategies
// =============================================================================

/// Strategy for generating a consistent StoreDump.
///
/// The store has one file, a defined function `main` and an external
/// callee. Statement 1 is a call site; every context other than the root
/// (id 1) is entered through it, and the heap location is allocated there.
pub fn arb_store_dump() -> impl Strategy<Value = StoreDump> {
    (1..=MAX_STATEMENTS, 1..=MAX_CONTEXTS).prop_flat_map(|(statements, contexts)| {
        let lines = prop::collection::vec((1u32..200, 1u32..80), statements as usize);
        let checks = prop::collection::vec(
            (1..=statements, 1..=contexts, arb_check_spec()),
            0..=MAX_CHECKS,
        );
        (Just(contexts), lines, checks).prop_map(build_store)
    })
}

fn build_store(
    (contexts, lines, checks): (u64, Vec<(u32, u32)>, Vec<(u64, u64, CheckSpec)>),
) -> StoreDump {
    let mut builder = StoreBuilder::new()
        .file(1, "src/gen.c")
        .function(1, "main", Some(1))
        .function(CALLEE, "callee", None)
        .operand(POINTERS[0], ValueKind::LocalVariable, "main.p")
        .operand(POINTERS[1], ValueKind::LocalVariable, "main.q")
        .operand(CONSTANT_ONE, ValueKind::IntegerConstant, "1")
        .memory_location(LOCAL_BUF, MemoryLocationKind::Local, named("main.buf"))
        .memory_location(
            HEAP,
            MemoryLocationKind::DynAlloc,
            Some(MemoryLocationInfo {
                call_id: Some(1),
                ..MemoryLocationInfo::default()
            }),
        )
        .memory_location(GLOBAL_TABLE, MemoryLocationKind::Global, named("table"))
        .root_context(1, 1);

    for (index, (line, column)) in lines.into_iter().enumerate() {
        let id = index as u64 + 1;
        builder = if id == 1 {
            builder.call_statement(id, 1, Some(1), line, column)
        } else {
            builder.statement(id, 1, Some(1), line, column)
        };
    }
    for id in 2..=contexts {
        builder = builder.call_context(id, 1, 1, 1);
    }

    let mut dump = builder.build();
    dump.checks = checks
        .into_iter()
        .enumerate()
        .map(|(index, (statement_id, call_context_id, spec))| RawCheck {
            id: index as u64 + 1,
            kind: spec.kind,
            checker: spec.kind.checker(),
            status: spec.status,
            statement_id,
            call_context_id,
            operands: (!spec.operands.is_empty()).then_some(spec.operands),
            info: spec.info,
        })
        .collect();
    dump
}

fn named(name: &str) -> Option<MemoryLocationInfo> {
    Some(MemoryLocationInfo {
        name: Some(name.to_string()),
        ..MemoryLocationInfo::default()
    })
}

// =============================================================================
// Config Strategies
// =============================================================================

/// Strategy for generating config Defaults with any subset of fields set.
pub fn arb_defaults() -> impl Strategy<Value = Defaults> {
    (
        proptest::option::of(arb_report_format()),
        proptest::option::of(1u8..=4),
        proptest::option::of(arb_status_filter()),
        proptest::option::of(arb_analyses_filter()),
        proptest::option::of(0usize..10),
        proptest::option::of(0usize..50),
    )
        .prop_map(
            |(format, verbosity, status_filter, analyses_filter, max_call_depth, auto_threshold)| {
                Defaults {
                    format,
                    verbosity,
                    status_filter,
                    analyses_filter,
                    max_call_depth,
                    auto_threshold,
                }
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn generated_stores_only_reference_existing_rows(dump in arb_store_dump()) {
            let statements: BTreeSet<u64> = dump.statements.iter().map(|s| s.id).collect();
            let contexts: BTreeSet<u64> = dump.call_contexts.iter().map(|c| c.id).collect();
            let operands: BTreeSet<u64> = dump.operands.iter().map(|o| o.id).collect();
            for check in &dump.checks {
                prop_assert!(statements.contains(&check.statement_id));
                prop_assert!(contexts.contains(&check.call_context_id));
                for operand in check.operands.iter().flatten() {
                    prop_assert!(operands.contains(&operand.operand_id()));
                }
            }
        }

        #[test]
        fn dead_code_checks_are_ok_or_unreachable(spec in arb_check_spec()) {
            if spec.kind == CheckKind::Unreachable {
                prop_assert!(matches!(spec.status, Status::Ok | Status::Unreachable));
            }
            prop_assert!(statuses_for(spec.kind).contains(&spec.status));
        }

        #[test]
        fn generated_evidence_only_references_existing_rows(dump in arb_store_dump()) {
            let locations: BTreeSet<u64> = dump.memory_locations.iter().map(|l| l.id).collect();
            let functions: BTreeSet<u64> = dump.functions.iter().map(|f| f.id).collect();
            for info in dump.checks.iter().filter_map(|c| c.info.as_ref()) {
                if let Some(fun_id) = info.get("fun_id").and_then(Value::as_u64) {
                    prop_assert!(functions.contains(&fun_id));
                }
                for target in info.get("points_to").and_then(Value::as_array).into_iter().flatten() {
                    if let Some(id) = target.get("id").and_then(Value::as_u64) {
                        prop_assert!(locations.contains(&id));
                    }
                }
            }
        }

        #[test]
        fn generated_check_ids_are_unique(dump in arb_store_dump()) {
            let ids: BTreeSet<u64> = dump.checks.iter().map(|c| c.id).collect();
            prop_assert_eq!(ids.len(), dump.checks.len());
        }
    }
}
