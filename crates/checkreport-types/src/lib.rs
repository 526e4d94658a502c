//! Data types (store dump + config) for checkreport.
//!
//! This crate is intentionally "dumb": pure DTOs with serde + schemars.
//! Enumerations persisted by the analyzer are integer-coded on the wire and
//! decode through `TryFrom<u8>`, so an unknown code is a deserialization error.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Schema Identifiers ─────────────────────────────────────────
pub const STORE_SCHEMA_V1: &str = "checkreport.store.v1";

/// Timing record written by the analyzer driver itself.
pub const ANALYZER_PASS: &str = "ikos-analyzer";

/// Raised when an integer code does not name a known enumeration member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCode {
    pub enumeration: &'static str,
    pub code: u8,
}

impl fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} code {}", self.enumeration, self.code)
    }
}

impl std::error::Error for UnknownCode {}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.code()
            }
        }

        impl TryFrom<u8> for $name {
            type Error = UnknownCode;

            fn try_from(code: u8) -> Result<Self, UnknownCode> {
                $name::from_code(code).ok_or(UnknownCode {
                    enumeration: stringify!($name),
                    code,
                })
            }
        }

        impl JsonSchema for $name {
            fn schema_name() -> String {
                stringify!($name).to_string()
            }

            fn json_schema(generator: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
                <u8 as JsonSchema>::json_schema(generator)
            }
        }
    };
}

// ── Verdicts ───────────────────────────────────────────────────

coded_enum! {
    /// Verdict of a single check. `Ord` follows the integer code.
    pub enum Status {
        Ok = 0,
        Warning = 1,
        Error = 2,
        Unreachable = 3,
    }
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Error => "error",
            Status::Unreachable => "unreachable",
        }
    }

    /// Word used by the text renderer.
    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "safe",
            other => other.as_str(),
        }
    }

    /// Parses a status name; `safe` is accepted as an alias of `ok`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ok" | "safe" => Some(Status::Ok),
            "warning" => Some(Status::Warning),
            "error" => Some(Status::Error),
            "unreachable" => Some(Status::Unreachable),
            _ => None,
        }
    }
}

coded_enum! {
    /// Category of property checked at a statement.
    ///
    /// Codes are sparse: the analyzer reserves gaps for range markers.
    pub enum CheckKind {
        Unreachable = 0,
        UnexpectedOperand = 1,
        UninitializedVariable = 2,
        Assert = 3,
        DivisionByZero = 4,
        ShiftCount = 5,
        SignedIntUnderflow = 7,
        SignedIntOverflow = 8,
        UnsignedIntUnderflow = 9,
        UnsignedIntOverflow = 10,
        NullPointerDereference = 12,
        NullPointerComparison = 13,
        InvalidPointerComparison = 14,
        PointerComparison = 15,
        PointerOverflow = 16,
        InvalidPointerDereference = 17,
        UnknownMemoryAccess = 18,
        UnalignedPointer = 19,
        BufferOverflowGets = 21,
        BufferOverflow = 22,
        IgnoredStore = 25,
        IgnoredMemoryCopy = 26,
        IgnoredMemoryMove = 27,
        IgnoredMemorySet = 28,
        IgnoredFree = 29,
        IgnoredCallSideEffectOnPointerParameter = 30,
        IgnoredCallSideEffect = 31,
        RecursiveFunctionCall = 32,
        FunctionCallInlineAssembly = 35,
        UnknownFunctionCallPointer = 36,
        FunctionCall = 37,
        Free = 39,
    }
}

impl CheckKind {
    pub fn short_name(self) -> &'static str {
        match self {
            CheckKind::Unreachable => "unreachable",
            CheckKind::UnexpectedOperand => "unexpected-operand",
            CheckKind::UninitializedVariable => "uninitialized-variable",
            CheckKind::Assert => "assert",
            CheckKind::DivisionByZero => "division-by-zero",
            CheckKind::ShiftCount => "shift-count",
            CheckKind::SignedIntUnderflow => "signed-int-underflow",
            CheckKind::SignedIntOverflow => "signed-int-overflow",
            CheckKind::UnsignedIntUnderflow => "unsigned-int-underflow",
            CheckKind::UnsignedIntOverflow => "unsigned-int-overflow",
            CheckKind::NullPointerDereference => "null-pointer-deref",
            CheckKind::NullPointerComparison => "null-pointer-comparison",
            CheckKind::InvalidPointerComparison => "invalid-pointer-comparison",
            CheckKind::PointerComparison => "pointer-comparison",
            CheckKind::PointerOverflow => "pointer-overflow",
            CheckKind::InvalidPointerDereference => "invalid-pointer-deref",
            CheckKind::UnknownMemoryAccess => "unknown-memory-access",
            CheckKind::UnalignedPointer => "unaligned-pointer",
            CheckKind::BufferOverflowGets => "buffer-overflow-gets",
            CheckKind::BufferOverflow => "buffer-overflow",
            CheckKind::IgnoredStore => "ignored-store",
            CheckKind::IgnoredMemoryCopy => "ignored-memory-copy",
            CheckKind::IgnoredMemoryMove => "ignored-memory-move",
            CheckKind::IgnoredMemorySet => "ignored-memory-set",
            CheckKind::IgnoredFree => "ignored-free",
            CheckKind::IgnoredCallSideEffectOnPointerParameter => {
                "ignored-call-side-effect-pointer-param"
            }
            CheckKind::IgnoredCallSideEffect => "ignored-call-side-effect",
            CheckKind::RecursiveFunctionCall => "recursive-function-call",
            CheckKind::FunctionCallInlineAssembly => "function-call-inline-asm",
            CheckKind::UnknownFunctionCallPointer => "unknown-function-call-pointer",
            CheckKind::FunctionCall => "function-call",
            CheckKind::Free => "free",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            CheckKind::Unreachable => "dead code",
            CheckKind::UnexpectedOperand => "unexpected operand",
            CheckKind::UninitializedVariable => "uninitialized variable",
            CheckKind::Assert => "assert",
            CheckKind::DivisionByZero => "division by zero",
            CheckKind::ShiftCount => "shift count",
            CheckKind::SignedIntUnderflow => "signed integer underflow",
            CheckKind::SignedIntOverflow => "signed integer overflow",
            CheckKind::UnsignedIntUnderflow => "unsigned integer underflow",
            CheckKind::UnsignedIntOverflow => "unsigned integer overflow",
            CheckKind::NullPointerDereference => "null pointer dereference",
            CheckKind::NullPointerComparison => "null pointer comparison",
            CheckKind::InvalidPointerComparison => "invalid pointer comparison",
            CheckKind::PointerComparison => "pointer comparison",
            CheckKind::PointerOverflow => "pointer overflow",
            CheckKind::InvalidPointerDereference => "invalid pointer dereference",
            CheckKind::UnknownMemoryAccess => "unknown memory access",
            CheckKind::UnalignedPointer => "unaligned pointer",
            CheckKind::BufferOverflowGets => "buffer overflow gets",
            CheckKind::BufferOverflow => "buffer overflow",
            CheckKind::IgnoredStore => "ignored store",
            CheckKind::IgnoredMemoryCopy => "ignored memory copy",
            CheckKind::IgnoredMemoryMove => "ignored memory move",
            CheckKind::IgnoredMemorySet => "ignored memory set",
            CheckKind::IgnoredFree => "ignored free",
            CheckKind::IgnoredCallSideEffectOnPointerParameter => {
                "ignored call side effect on pointer parameter"
            }
            CheckKind::IgnoredCallSideEffect => "ignored call side effect",
            CheckKind::RecursiveFunctionCall => "recursive function call",
            CheckKind::FunctionCallInlineAssembly => "function call inline assembly",
            CheckKind::UnknownFunctionCallPointer => "unknown function call pointer",
            CheckKind::FunctionCall => "function call",
            CheckKind::Free => "free",
        }
    }

    /// Analysis that normally produces checks of this kind.
    pub fn checker(self) -> Checker {
        match self {
            CheckKind::Unreachable => Checker::DeadCode,
            CheckKind::UnexpectedOperand
            | CheckKind::IgnoredStore
            | CheckKind::IgnoredMemoryCopy
            | CheckKind::IgnoredMemoryMove
            | CheckKind::IgnoredMemorySet
            | CheckKind::IgnoredFree
            | CheckKind::IgnoredCallSideEffectOnPointerParameter
            | CheckKind::IgnoredCallSideEffect
            | CheckKind::RecursiveFunctionCall => Checker::Soundness,
            CheckKind::UninitializedVariable => Checker::UninitializedVariable,
            CheckKind::Assert => Checker::AssertionProver,
            CheckKind::DivisionByZero => Checker::DivisionByZero,
            CheckKind::ShiftCount => Checker::ShiftCount,
            CheckKind::SignedIntUnderflow | CheckKind::SignedIntOverflow => Checker::SignedIntOverflow,
            CheckKind::UnsignedIntUnderflow | CheckKind::UnsignedIntOverflow => {
                Checker::UnsignedIntOverflow
            }
            CheckKind::NullPointerDereference | CheckKind::NullPointerComparison => {
                Checker::NullPointerDereference
            }
            CheckKind::InvalidPointerComparison | CheckKind::PointerComparison => {
                Checker::PointerComparison
            }
            CheckKind::PointerOverflow => Checker::PointerOverflow,
            CheckKind::InvalidPointerDereference
            | CheckKind::UnknownMemoryAccess
            | CheckKind::BufferOverflowGets
            | CheckKind::BufferOverflow => Checker::BufferOverflow,
            CheckKind::UnalignedPointer => Checker::UnalignedPointer,
            CheckKind::FunctionCallInlineAssembly
            | CheckKind::UnknownFunctionCallPointer
            | CheckKind::FunctionCall => Checker::FunctionCall,
            CheckKind::Free => Checker::DoubleFree,
        }
    }
}

coded_enum! {
    /// Analysis that produced a check.
    pub enum Checker {
        BufferOverflow = 0,
        DivisionByZero = 1,
        NullPointerDereference = 2,
        AssertionProver = 3,
        UnalignedPointer = 4,
        UninitializedVariable = 5,
        SignedIntOverflow = 6,
        UnsignedIntOverflow = 7,
        ShiftCount = 8,
        PointerOverflow = 9,
        PointerComparison = 10,
        Soundness = 11,
        FunctionCall = 12,
        DeadCode = 13,
        DoubleFree = 14,
        Debugger = 15,
        MemoryWatcher = 16,
    }
}

impl Checker {
    /// Name accepted by `--analyses-filter`.
    pub fn short_name(self) -> &'static str {
        match self {
            Checker::BufferOverflow => "boa",
            Checker::DivisionByZero => "dbz",
            Checker::NullPointerDereference => "nullity",
            Checker::AssertionProver => "prover",
            Checker::UnalignedPointer => "upa",
            Checker::UninitializedVariable => "uva",
            Checker::SignedIntOverflow => "sio",
            Checker::UnsignedIntOverflow => "uio",
            Checker::ShiftCount => "shc",
            Checker::PointerOverflow => "poa",
            Checker::PointerComparison => "pcmp",
            Checker::Soundness => "sound",
            Checker::FunctionCall => "fca",
            Checker::DeadCode => "dca",
            Checker::DoubleFree => "dfa",
            Checker::Debugger => "dbg",
            Checker::MemoryWatcher => "watch",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            Checker::BufferOverflow => "Buffer Overflow Analysis",
            Checker::DivisionByZero => "Division by Zero Analysis",
            Checker::NullPointerDereference => "Null Pointer Dereference Analysis",
            Checker::AssertionProver => "Assertion Prover",
            Checker::UnalignedPointer => "Unaligned Pointer Analysis",
            Checker::UninitializedVariable => "Uninitialized Variables Analysis",
            Checker::SignedIntOverflow => "Signed Integer Overflow Analysis",
            Checker::UnsignedIntOverflow => "Unsigned Integer Overflow Analysis",
            Checker::ShiftCount => "Shift Count Analysis",
            Checker::PointerOverflow => "Pointer Overflow Analysis",
            Checker::PointerComparison => "Pointer Comparison Analysis",
            Checker::Soundness => "Soundness Analysis",
            Checker::FunctionCall => "Function Call Analysis",
            Checker::DeadCode => "Dead Code Analysis",
            Checker::DoubleFree => "Double Free Analysis",
            Checker::Debugger => "Debugger",
            Checker::MemoryWatcher => "Memory Watcher",
        }
    }

    pub fn rule_description(self) -> &'static str {
        match self {
            Checker::BufferOverflow => {
                "checks for buffer overflows and out-of-bound array accesses."
            }
            Checker::DivisionByZero => "checks for integer divisions by zero.",
            Checker::NullPointerDereference => "checks for null pointer dereferences.",
            Checker::AssertionProver => "prove user-defined properties, using __ikos_assert(condition).",
            Checker::UnalignedPointer => "checks for unaligned pointer dereferences.",
            Checker::UninitializedVariable => "checks for read of uninitialized variables.",
            Checker::SignedIntOverflow => "checks for signed integer overflows.",
            Checker::UnsignedIntOverflow => "checks for unsigned integer overflows.",
            Checker::ShiftCount => {
                "checks for invalid shifts, where the amount shifted is greater or equal to the bit-width of the left operand, or less than zero."
            }
            Checker::PointerOverflow => "checks for pointer arithmetic overflows.",
            Checker::PointerComparison => "checks for pointer comparisons between pointers referring to different objects.",
            Checker::Soundness => "checks for instructions that could make the analysis unsound, i.e miss bugs.",
            Checker::FunctionCall => "checks for function calls through function pointers of the wrong type.",
            Checker::DeadCode => "checks for unreachable statements.",
            Checker::DoubleFree => "checks for double free, invalid free, use after free and use after return.",
            Checker::Debugger => "prints debug information, using __ikos_print_values(\"desc\", x) and __ikos_print_invariant().",
            Checker::MemoryWatcher => "prints memory writes at a given memory location, using __ikos_watch_mem(ptr, size)",
        }
    }
}

// ── Program entities ───────────────────────────────────────────

coded_enum! {
    pub enum StatementKind {
        Assignment = 0,
        UnaryOperation = 1,
        BinaryOperation = 2,
        Comparison = 3,
        Return = 4,
        Unreachable = 5,
        Allocate = 6,
        PointerShift = 7,
        Load = 8,
        Store = 9,
        ExtractElement = 10,
        InsertElement = 11,
        Call = 13,
        Invoke = 14,
        LandingPad = 16,
        Resume = 17,
    }
}

coded_enum! {
    /// Kind of an operand. Codes 1..=12 are constants, 15..=17 variables.
    pub enum ValueKind {
        UndefinedConstant = 1,
        IntegerConstant = 2,
        FloatConstant = 3,
        NullConstant = 4,
        StructConstant = 5,
        ArrayConstant = 7,
        VectorConstant = 8,
        AggregateZeroConstant = 10,
        FunctionPointerConstant = 11,
        InlineAssemblyConstant = 12,
        GlobalVariable = 15,
        LocalVariable = 16,
        InternalVariable = 17,
    }
}

impl ValueKind {
    pub fn is_constant(self) -> bool {
        self.code() <= 13
    }
}

coded_enum! {
    pub enum MemoryLocationKind {
        Local = 0,
        Global = 1,
        Function = 2,
        Aggregate = 3,
        AbsoluteZero = 4,
        Argv = 5,
        LibcErrno = 6,
        DynAlloc = 7,
    }
}

coded_enum! {
    /// Per-target classification carried by buffer overflow evidence.
    pub enum BufferOverflowCheckKind {
        Function = 0,
        UseAfterFree = 1,
        UseAfterReturn = 2,
        HardwareAddresses = 3,
        OutOfBound = 4,
    }
}

coded_enum! {
    /// Per-target classification carried by function call evidence.
    pub enum FunctionCallCheckKind {
        NotFunction = 0,
        WrongSignature = 1,
        Ok = 2,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct File {
    pub id: u64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Function {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demangled: Option<String>,
    #[serde(default)]
    pub definition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Function {
    /// Demangled name when available, raw name otherwise.
    pub fn pretty_name(&self) -> &str {
        self.demangled.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Statement {
    pub id: u64,
    pub kind: StatementKind,
    pub function_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Operand {
    pub id: u64,
    pub kind: ValueKind,
    /// Textual representation as printed by the analyzer.
    pub repr: String,
}

/// A node in the call-context tree. The root (entry point) has no `call_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CallContext {
    pub id: u64,
    /// Statement id of the call site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<u64>,
    /// Function entered by this context (root) or containing the call site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

impl CallContext {
    pub fn is_root(&self) -> bool {
        self.call_id.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemoryLocationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demangle: Option<String>,
    /// Printed initializer of a constant global.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cst: Option<String>,
    /// Function id, for function locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Allocation site statement id, for dynamic allocations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MemoryLocation {
    pub id: u64,
    pub kind: MemoryLocationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<MemoryLocationInfo>,
}

/// Positional operand reference: `[position, operand_id]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct OperandRef(pub u32, pub u64);

impl OperandRef {
    pub fn position(self) -> u32 {
        self.0
    }

    pub fn operand_id(self) -> u64 {
        self.1
    }
}

/// One analyzer verdict, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawCheck {
    pub id: u64,
    pub kind: CheckKind,
    pub checker: Checker,
    pub status: Status,
    pub statement_id: u64,
    pub call_context_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operands: Option<Vec<OperandRef>>,
    /// Kind-specific evidence payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimingRecord {
    pub pass: String,
    pub seconds: f64,
}

/// Everything one analyzer run persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StoreDump {
    pub schema: String,
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub statements: Vec<Statement>,
    #[serde(default)]
    pub operands: Vec<Operand>,
    #[serde(default)]
    pub call_contexts: Vec<CallContext>,
    #[serde(default)]
    pub memory_locations: Vec<MemoryLocation>,
    #[serde(default)]
    pub checks: Vec<RawCheck>,
    #[serde(default)]
    pub times: Vec<TimingRecord>,
    #[serde(default)]
    pub settings: BTreeMap<String, serde_json::Value>,
}

impl Default for StoreDump {
    fn default() -> Self {
        Self {
            schema: STORE_SCHEMA_V1.to_string(),
            files: vec![],
            functions: vec![],
            statements: vec![],
            operands: vec![],
            call_contexts: vec![],
            memory_locations: vec![],
            checks: vec![],
            times: vec![],
            settings: BTreeMap::new(),
        }
    }
}

// ── Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Text,
    Json,
    Sarif,
    Csv,
    Junit,
    Auto,
    No,
}

impl ReportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Sarif => "sarif",
            ReportFormat::Csv => "csv",
            ReportFormat::Junit => "junit",
            ReportFormat::Auto => "auto",
            ReportFormat::No => "no",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ReportFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyses_filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_call_depth: Option<usize>,

    /// Entry count above which `auto` prints a hint instead of the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_threshold: Option<usize>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            format: Some(ReportFormat::Auto),
            verbosity: Some(1),
            status_filter: Some("error,warning,unreachable".to_string()),
            analyses_filter: Some("*".to_string()),
            max_call_depth: Some(3),
            auto_threshold: Some(15),
        }
    }
}
