//! Unified error type and stable error codes for the rename/hot-reload engine.
//!
//! Planning and batch-validation surfaces return structured summaries
//! (`{valid, errors, warnings}`) and do not use this type for ordinary
//! semantic issues (see `conflict::Conflict`). `RenameError` is reserved for
//! the unrecoverable conditions listed in the error handling design: bad
//! shapes at the API boundary, missing symbols, detected overlaps and
//! cycles, and duplicate targets.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable numeric codes for error reporting, independent of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    InvalidArgument = 1,
    InvalidIdentifier = 2,
    MalformedSymbolId = 3,
    MissingSymbol = 4,
    Conflict = 5,
    Overlap = 6,
    CycleInBatch = 7,
    DuplicateTarget = 8,
    DuplicateSymbol = 9,
    TranspilerFailure = 10,
    ReadFailure = 11,
    AnalysisError = 12,
}

impl ErrorCode {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum RenameError {
    /// Structural failure at the API boundary: null request, wrong shape, empty batch.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// `newName` fails the identifier regex or the whitespace rule.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// Symbol id has fewer than 3 `/`-separated segments, or an unknown kind.
    #[error("malformed symbol id: {id}")]
    MalformedSymbolId { id: String },

    /// The semantic analyzer reports no such symbol.
    #[error("symbol not found: {symbol_id}")]
    MissingSymbol { symbol_id: String },

    /// `newName` equals the bare name of `symbolId`.
    #[error("new name '{name}' is the same as the current name")]
    SameName { name: String },

    /// One or more conflicts were detected while planning a rename.
    #[error("rename conflicts: {}", messages.join("; "))]
    Conflict { messages: Vec<String> },

    /// Two edits in the same file have overlapping ranges.
    #[error("overlapping edits in {file}: {first_start}-{first_end} overlaps {second_start}-{second_end}")]
    Overlap {
        file: String,
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    /// A rename chain within a batch forms a cycle.
    #[error("circular rename chain: {}", chain.join(" -> "))]
    CycleInBatch { chain: Vec<String> },

    /// Two renames in a batch produce the same normalized target name.
    #[error("duplicate rename target: {name}")]
    DuplicateTarget { name: String },

    /// The batch lists the same source symbol id twice.
    #[error("duplicate symbol in batch: {symbol_id}")]
    DuplicateSymbol { symbol_id: String },

    /// Internal/unexpected failure during impact analysis.
    #[error("analysis error: {message}")]
    AnalysisError { message: String },
}

impl From<&RenameError> for ErrorCode {
    fn from(err: &RenameError) -> Self {
        match err {
            RenameError::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            RenameError::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            RenameError::MalformedSymbolId { .. } => ErrorCode::MalformedSymbolId,
            RenameError::MissingSymbol { .. } => ErrorCode::MissingSymbol,
            RenameError::SameName { .. } => ErrorCode::InvalidArgument,
            RenameError::Conflict { .. } => ErrorCode::Conflict,
            RenameError::Overlap { .. } => ErrorCode::Overlap,
            RenameError::CycleInBatch { .. } => ErrorCode::CycleInBatch,
            RenameError::DuplicateTarget { .. } => ErrorCode::DuplicateTarget,
            RenameError::DuplicateSymbol { .. } => ErrorCode::DuplicateSymbol,
            RenameError::AnalysisError { .. } => ErrorCode::AnalysisError,
        }
    }
}

impl From<RenameError> for ErrorCode {
    fn from(err: RenameError) -> Self {
        ErrorCode::from(&err)
    }
}

impl RenameError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RenameError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }
}

pub type RenameResult<T> = Result<T, RenameError>;

// ============================================================================
// Tests
// ============================================================================
