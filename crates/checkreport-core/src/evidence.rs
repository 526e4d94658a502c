//! Typed evidence payloads, one shape per check kind.
//!
//! The store keeps `info` as untyped JSON; it is decoded exactly once, when
//! the store is loaded, so message handlers never re-parse it.

use checkreport_types::{BufferOverflowCheckKind, CheckKind, FunctionCallCheckKind, Status};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::numeric::{Congruence, Interval};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    None,
    Interval(Interval),
    IntOverflow(IntOverflowInfo),
    Alignment(AlignmentInfo),
    BufferOverflow(BufferOverflowInfo),
    Callee(CalleeInfo),
    FunctionCall(FunctionCallInfo),
    Free(FreeInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntOverflowInfo {
    pub left: Interval,
    pub right: Interval,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlignmentInfo {
    pub requirement: Congruence,
    pub offset: Congruence,
    #[serde(default)]
    pub points_to: Vec<AlignmentTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlignmentTarget {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congruence: Option<Congruence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferOverflowInfo {
    pub points_to: Vec<BufferTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_size: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Interval>,
    /// Element size in bytes when the access indexes an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_element_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferTarget {
    pub kind: BufferOverflowCheckKind,
    pub status: Status,
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Interval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalleeInfo {
    pub fun_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionCallInfo {
    pub points_to: Vec<CallTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FunctionCallCheckKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fun_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FreeInfo {
    pub points_to: Vec<FreeTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FreeTarget {
    pub id: u64,
    pub status: Status,
}

impl Evidence {
    /// Decodes the raw payload of a check of the given kind.
    ///
    /// A missing or null payload decodes to [`Evidence::None`]; OK verdicts
    /// usually carry none. A payload that does not fit the kind's shape is
    /// [`ReportError::MalformedEvidence`].
    pub fn decode(kind: CheckKind, info: Option<&serde_json::Value>) -> Result<Self, ReportError> {
        let Some(value) = info.filter(|v| !v.is_null()) else {
            return Ok(Evidence::None);
        };

        let evidence = match kind {
            CheckKind::DivisionByZero | CheckKind::ShiftCount => {
                Evidence::Interval(parse(kind, value)?)
            }
            CheckKind::SignedIntUnderflow
            | CheckKind::SignedIntOverflow
            | CheckKind::UnsignedIntUnderflow
            | CheckKind::UnsignedIntOverflow => Evidence::IntOverflow(parse(kind, value)?),
            CheckKind::UnalignedPointer => Evidence::Alignment(parse(kind, value)?),
            CheckKind::BufferOverflow => Evidence::BufferOverflow(parse(kind, value)?),
            CheckKind::IgnoredCallSideEffectOnPointerParameter
            | CheckKind::IgnoredCallSideEffect
            | CheckKind::RecursiveFunctionCall => Evidence::Callee(parse(kind, value)?),
            CheckKind::FunctionCall => Evidence::FunctionCall(parse(kind, value)?),
            CheckKind::Free => Evidence::Free(parse(kind, value)?),
            CheckKind::Unreachable
            | CheckKind::UnexpectedOperand
            | CheckKind::UninitializedVariable
            | CheckKind::Assert
            | CheckKind::NullPointerDereference
            | CheckKind::NullPointerComparison
            | CheckKind::InvalidPointerComparison
            | CheckKind::PointerComparison
            | CheckKind::PointerOverflow
            | CheckKind::InvalidPointerDereference
            | CheckKind::UnknownMemoryAccess
            | CheckKind::BufferOverflowGets
            | CheckKind::IgnoredStore
            | CheckKind::IgnoredMemoryCopy
            | CheckKind::IgnoredMemoryMove
            | CheckKind::IgnoredMemorySet
            | CheckKind::IgnoredFree
            | CheckKind::FunctionCallInlineAssembly
            | CheckKind::UnknownFunctionCallPointer => Evidence::None,
        };
        Ok(evidence)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Evidence::None)
    }
}

fn parse<T: DeserializeOwned>(kind: CheckKind, value: &serde_json::Value) -> Result<T, ReportError> {
    T::deserialize(value).map_err(|e| ReportError::MalformedEvidence {
        kind,
        detail: e.to_string(),
    })
}

/// Accessors used by message handlers; each fails with `MalformedEvidence`
/// when the payload is absent or of another shape.
macro_rules! evidence_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name(&self, kind: CheckKind) -> Result<&$ty, ReportError> {
            match self {
                Evidence::$variant(inner) => Ok(inner),
                _ => Err(ReportError::MalformedEvidence {
                    kind,
                    detail: concat!("expected ", stringify!($variant), " evidence").to_string(),
                }),
            }
        }
    };
}

impl Evidence {
    evidence_accessor!(interval, Interval, Interval);
    evidence_accessor!(int_overflow, IntOverflow, IntOverflowInfo);
    evidence_accessor!(alignment, Alignment, AlignmentInfo);
    evidence_accessor!(buffer_overflow, BufferOverflow, BufferOverflowInfo);
    evidence_accessor!(callee, Callee, CalleeInfo);
    evidence_accessor!(function_call, FunctionCall, FunctionCallInfo);
    evidence_accessor!(free, Free, FreeInfo);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_and_null_payloads_decode_to_none() {
        assert!(Evidence::decode(CheckKind::DivisionByZero, None).unwrap().is_none());
        let null = serde_json::Value::Null;
        assert!(Evidence::decode(CheckKind::Free, Some(&null)).unwrap().is_none());
    }

    #[test]
    fn interval_payload_decodes_for_division() {
        let info = json!({"type": "s32", "lb": -5, "ub": 5});
        let evidence = Evidence::decode(CheckKind::DivisionByZero, Some(&info)).unwrap();
        let itv = evidence.interval(CheckKind::DivisionByZero).unwrap();
        assert_eq!(itv.lb().value(), -5);
        assert_eq!(itv.ub().value(), 5);
    }

    #[test]
    fn wrong_shape_is_malformed_evidence() {
        let info = json!({"left": {"type": "s32", "lb": 0, "ub": 1}});
        let err = Evidence::decode(CheckKind::SignedIntOverflow, Some(&info)).unwrap_err();
        assert!(matches!(err, ReportError::MalformedEvidence { kind: CheckKind::SignedIntOverflow, .. }));
    }

    #[test]
    fn accessor_rejects_other_variant() {
        let err = Evidence::None.free(CheckKind::Free).unwrap_err();
        assert!(err.to_string().contains("expected Free evidence"));
    }

    #[test]
    fn buffer_overflow_targets_keep_integer_codes() {
        let info = json!({
            "points_to": [{"kind": 4, "status": 2, "id": 7, "size": {"type": "u64", "lb": 40, "ub": 40}}],
            "access_size": {"type": "u64", "lb": 4, "ub": 4},
            "offset": {"type": "u64", "lb": 40, "ub": 40},
            "array_element_size": 4
        });
        let evidence = Evidence::decode(CheckKind::BufferOverflow, Some(&info)).unwrap();
        let bo = evidence.buffer_overflow(CheckKind::BufferOverflow).unwrap();
        assert_eq!(bo.points_to[0].kind, BufferOverflowCheckKind::OutOfBound);
        assert_eq!(bo.points_to[0].status, Status::Error);
        assert_eq!(bo.array_element_size, Some(4));
    }

    #[test]
    fn equal_payloads_hash_equal() {
        use std::collections::HashSet;
        let info = json!({"fun_id": 3});
        let a = Evidence::decode(CheckKind::RecursiveFunctionCall, Some(&info)).unwrap();
        let b = Evidence::decode(CheckKind::RecursiveFunctionCall, Some(&info)).unwrap();
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}
