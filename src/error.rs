//! Error types for lanewise operations.
//!
//! Every fallible vector, mask, shuffle and memory operation reports one of
//! these errors instead of panicking. None of them is recovered internally:
//! they are local, synchronous failures the caller either avoids by checking
//! the precondition or handles.

use thiserror::Error;

use crate::lane::LaneType;

/// Errors that can occur during lanewise operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaneError {
    /// Two operands of one operation do not share the same species.
    #[error("incompatible species: expected {expected}, found {found}")]
    IncompatibleSpecies {
        /// Species of the receiver.
        expected: String,
        /// Species of the offending operand.
        found: String,
    },

    /// A required index lies outside the target range.
    #[error("index out of bounds: {message} (index {index}, length {length})")]
    OutOfBounds {
        /// First offending index.
        index: i64,
        /// Length of the accessed range.
        length: usize,
        /// Human-readable error message.
        message: String,
    },

    /// A scalar or shape cannot be represented exactly.
    #[error("value out of range: {message}")]
    ValueRange {
        /// Human-readable error message.
        message: String,
    },

    /// Integer division or remainder by zero in a selected lane.
    #[error("arithmetic error: {message}")]
    Arithmetic {
        /// Human-readable error message.
        message: String,
    },

    /// The operation has no meaning for the lane type.
    #[error("unsupported operation {operation} for {lane_type} lanes")]
    Unsupported {
        /// Name of the rejected operation.
        operation: String,
        /// Lane type the operation was invoked on.
        lane_type: LaneType,
    },

    /// The memory resource backing a segment has been released.
    #[error("memory resource released: {message}")]
    ResourceReleased {
        /// Human-readable error message.
        message: String,
    },

    /// A write targeted read-only memory.
    #[error("attempt to write a read-only segment of {byte_size} bytes")]
    ReadOnly {
        /// Size of the segment that rejected the write.
        byte_size: usize,
    },

    /// Input validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for lanewise operations.
pub type Result<T> = std::result::Result<T, LaneError>;

/// Creates an incompatible-species error.
pub fn incompatible_species(expected: impl ToString, found: impl ToString) -> LaneError {
    LaneError::IncompatibleSpecies {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Creates an out-of-bounds error.
pub fn out_of_bounds(index: i64, length: usize, message: impl Into<String>) -> LaneError {
    LaneError::OutOfBounds {
        index,
        length,
        message: message.into(),
    }
}

/// Creates a value-range error.
pub fn value_range(message: impl Into<String>) -> LaneError {
    LaneError::ValueRange {
        message: message.into(),
    }
}

/// Creates an arithmetic error.
pub fn arithmetic(message: impl Into<String>) -> LaneError {
    LaneError::Arithmetic {
        message: message.into(),
    }
}

/// Creates an unsupported-operation error.
pub fn unsupported(operation: impl ToString, lane_type: LaneType) -> LaneError {
    LaneError::Unsupported {
        operation: operation.to_string(),
        lane_type,
    }
}

/// Creates a released-resource error.
pub fn released_resource(message: impl Into<String>) -> LaneError {
    LaneError::ResourceReleased {
        message: message.into(),
    }
}

/// Creates a read-only error.
pub fn read_only(byte_size: usize) -> LaneError {
    LaneError::ReadOnly { byte_size }
}

/// Creates a validation error.
pub fn validation(message: impl Into<String>) -> LaneError {
    LaneError::Validation {
        message: message.into(),
    }
}

/// Checks that `[offset, offset + size)` lies inside `[0, length)`.
///
/// Returns the offset as `usize` so callers can index with it directly.
pub(crate) fn check_from_index_size(offset: isize, size: usize, length: usize) -> Result<usize> {
    if offset < 0 {
        return Err(out_of_bounds(
            offset as i64,
            length,
            format!("range [{offset}, {offset} + {size}) starts below zero"),
        ));
    }
    let start = offset as usize;
    match start.checked_add(size) {
        Some(end) if end <= length => Ok(start),
        _ => Err(out_of_bounds(
            offset as i64,
            length,
            format!("range [{offset}, {offset} + {size}) exceeds length"),
        )),
    }
}

/// Checks a single index against `[0, length)`.
pub(crate) fn check_index(index: i64, length: usize) -> Result<usize> {
    if index < 0 || index as u64 >= length as u64 {
        return Err(out_of_bounds(index, length, "index outside range"));
    }
    Ok(index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display() {
        let error = out_of_bounds(17, 16, "lane load");
        let display = format!("{}", error);
        assert!(display.contains("index out of bounds"));
        assert!(display.contains("index 17"));
        assert!(display.contains("length 16"));
        assert!(display.contains("lane load"));
    }

    #[test]
    fn test_unsupported_display_names_lane_type() {
        let error = unsupported("LSHL", LaneType::F32);
        let display = format!("{}", error);
        assert!(display.contains("LSHL"));
        assert!(display.contains("f32"));
    }

    #[test]
    fn test_check_from_index_size_accepts_exact_fit() {
        assert_eq!(check_from_index_size(8, 8, 16), Ok(8));
        assert_eq!(check_from_index_size(0, 0, 0), Ok(0));
    }

    #[test]
    fn test_check_from_index_size_rejects_overrun_and_negative() {
        assert!(matches!(
            check_from_index_size(9, 8, 16),
            Err(LaneError::OutOfBounds { index: 9, .. })
        ));
        assert!(matches!(
            check_from_index_size(-1, 8, 16),
            Err(LaneError::OutOfBounds { index: -1, .. })
        ));
        assert!(check_from_index_size(isize::MAX, 8, 16).is_err());
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index(3, 4), Ok(3));
        assert!(check_index(4, 4).is_err());
        assert!(check_index(-1, 4).is_err());
    }

    #[test]
    fn test_error_equality() {
        let error1 = arithmetic("divide by zero");
        let error2 = arithmetic("divide by zero");
        let error3 = value_range("divide by zero");

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = read_only(64);
        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
