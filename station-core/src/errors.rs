use station_types::{BlockTarget, DisplayKey, MemberId, TagId};
use thiserror::Error;

/// Operator-facing configuration errors. None of them change engine state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Tag not found: {0}")]
    TagNotFound(TagId),

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Cannot activate block for {0}: no duration staged and not permanent")]
    BlockNotConfigured(BlockTarget),

    #[error("Session needs a non-zero debounce window and code interval")]
    InvalidSessionConfig,

    #[error("Grid for display key {0} is fixed")]
    ReadOnlyGrid(DisplayKey),

    #[error("Grid cell ({row}, {col}) is outside the 8x8 grid")]
    CellOutOfRange { row: usize, col: usize },
}

/// Inbound line decode errors. The dispatcher logs and drops these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Line has no ':' separated payload")]
    MissingPayload,

    #[error("Field {index} is not a number: {value:?}")]
    InvalidNumber { index: usize, value: String },

    #[error("Expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("Enrollment prefix must be five zeros")]
    InvalidPrefix,

    #[error("Field {index} is out of byte range: {value}")]
    ByteOutOfRange { index: usize, value: u64 },

    #[error("Unknown status source: {0}")]
    UnknownStatusSource(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
