use checkreport_types::{CheckKind, Status};

/// Internal-consistency failures. Any of these aborts the whole render.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no {table} row with id {id}")]
    UnknownId { table: &'static str, id: u64 },

    #[error("{table} {id} has no '{field}'")]
    MissingField {
        table: &'static str,
        id: u64,
        field: &'static str,
    },

    #[error("duplicate {table} row with id {id}")]
    DuplicateId { table: &'static str, id: u64 },

    #[error("malformed evidence for check kind '{}': {detail}", kind.short_name())]
    MalformedEvidence { kind: CheckKind, detail: String },

    #[error("unexpected status '{}' for check kind '{}'", status.as_str(), kind.short_name())]
    UnexpectedStatus { kind: CheckKind, status: Status },

    #[error("missing operand for check kind '{}'", kind.short_name())]
    MissingOperand { kind: CheckKind },

    #[error("call context {id} has a cyclic parent chain")]
    CyclicCallContext { id: u64 },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("unknown {filter} '{choice}' (expected one of: {expected})")]
    UnknownChoice {
        filter: &'static str,
        choice: String,
        expected: String,
    },
}
