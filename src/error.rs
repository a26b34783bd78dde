//! Error types for binary marshaling.
//!
//! Every error is detected at the point of violation and returned to the immediate caller.
//! Nothing is truncated, clamped or padded silently, and no component retries internally.
//!
//! ## Error Categories
//!
//! - **Allocation**: a buffer larger than the configured ceiling, or the allocator refused
//! - **Out of bounds**: an offset/width pair outside a buffer
//! - **Value range**: a value that cannot be represented exactly in its declared field
//! - **Layout**: overlapping, duplicate or out-of-range field descriptors
//! - **Unknown field**: a field name the layout does not declare
//! - **Truncated input**: externally supplied bytes shorter than the record being parsed
//! - **Finalized writer**: a write after a writer produced its result
//!
//! ## Recovery
//!
//! ```rust
//! use structpack::MarshalError;
//!
//! let error = MarshalError::out_of_bounds(12, 4, 8);
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use thiserror::Error;

/// Result type alias for marshaling operations.
pub type Result<T, E = MarshalError> = std::result::Result<T, E>;

/// Main error type for marshaling operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarshalError {
    #[error("Cannot allocate {requested} bytes (limit {limit} bytes): {reason}")]
    Allocation { requested: usize, limit: usize, reason: String },

    #[error("Access of {width} bytes at offset {offset:#x} exceeds capacity {capacity}")]
    OutOfBounds { offset: usize, width: usize, capacity: usize },

    #[error("Value out of range for {kind}: {details}")]
    ValueRange { kind: String, details: String },

    #[error("Invalid layout: {details}")]
    Layout { details: String },

    #[error("Field '{field}' is not declared in the layout")]
    UnknownField { field: String },

    #[error("Input truncated: {what} needs {needed} bytes, only {available} available")]
    TruncatedInput { what: String, needed: usize, available: usize },

    #[error("Writer already finalized; {operation} is not allowed")]
    FinalizedWriter { operation: &'static str },
}

impl MarshalError {
    /// Returns whether the error was caused by the data handed in, rather than by the
    /// layout, buffer sizing or call sequence chosen by the caller.
    pub fn is_input_error(&self) -> bool {
        match self {
            MarshalError::ValueRange { .. } => true,
            MarshalError::UnknownField { .. } => true,
            MarshalError::TruncatedInput { .. } => true,
            MarshalError::Allocation { .. } => false,
            MarshalError::OutOfBounds { .. } => false,
            MarshalError::Layout { .. } => false,
            MarshalError::FinalizedWriter { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MarshalError::Allocation { .. } => vec![
                "Request a smaller buffer",
                "Raise BufferConfig::max_capacity if the size is legitimate",
                "Stream the payload in smaller pieces",
            ],
            MarshalError::OutOfBounds { .. } => vec![
                "Retry with a larger buffer",
                "Check the offset arithmetic against the record size",
            ],
            MarshalError::ValueRange { .. } => vec![
                "Use a wider field kind",
                "Validate the value before encoding",
                "Shorten the text or widen the fixed text field",
            ],
            MarshalError::Layout { .. } => vec![
                "Check field offsets for overlaps",
                "Make the record size cover every field",
                "Give every field a unique, non-zero width and name",
            ],
            MarshalError::UnknownField { .. } => vec![
                "Check field name spelling",
                "Declare the field in the layout",
            ],
            MarshalError::TruncatedInput { .. } => vec![
                "Supply at least the record size in bytes",
                "Treat the input as an unrecognized format",
            ],
            MarshalError::FinalizedWriter { .. } => {
                vec!["Create a new writer for further output"]
            }
        }
    }

    /// Helper constructor for allocation failures.
    pub fn allocation(requested: usize, limit: usize, reason: impl Into<String>) -> Self {
        MarshalError::Allocation { requested, limit, reason: reason.into() }
    }

    /// Helper constructor for out-of-bounds access.
    pub fn out_of_bounds(offset: usize, width: usize, capacity: usize) -> Self {
        MarshalError::OutOfBounds { offset, width, capacity }
    }

    /// Helper constructor for value range errors.
    pub fn value_range(kind: impl Into<String>, details: impl Into<String>) -> Self {
        MarshalError::ValueRange { kind: kind.into(), details: details.into() }
    }

    /// Helper constructor for layout errors.
    pub fn layout(details: impl Into<String>) -> Self {
        MarshalError::Layout { details: details.into() }
    }

    /// Helper constructor for unknown field errors.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        MarshalError::UnknownField { field: field.into() }
    }

    /// Helper constructor for truncated input errors.
    pub fn truncated(what: impl Into<String>, needed: usize, available: usize) -> Self {
        MarshalError::TruncatedInput { what: what.into(), needed, available }
    }
}
