//! Error types for grid operations.

use crate::axis::Axis;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised by the validator pipeline before any mutation takes place.
///
/// A failed operation leaves the grid exactly as it was: validation happens
/// strictly before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// An index addressed an element outside the current extent.
    #[error("{axis} index {index} out of range for length {len}")]
    IndexOutOfRange {
        axis: Axis,
        index: usize,
        len: usize,
    },

    /// A span (start + count) reached past the current extent.
    #[error("{axis} span starting at {at} with count {count} out of range for length {len}")]
    SpanOutOfRange {
        axis: Axis,
        at: usize,
        count: usize,
        len: usize,
    },

    /// An insertion index was past the end (valid range is `0..=len`).
    #[error("{axis} insertion index {at} out of range for length {len}")]
    InsertOutOfRange { axis: Axis, at: usize, len: usize },

    /// A bulk argument was jagged: one of its lines had the wrong length.
    #[error("jagged input: line {index} has length {found}, expected {expected}")]
    Jagged {
        index: usize,
        found: usize,
        expected: usize,
    },

    /// A single line had a length that does not match the orthogonal extent.
    #[error("line length {found} does not match the current {axis} extent {expected}")]
    LengthMismatch {
        axis: Axis,
        found: usize,
        expected: usize,
    },

    /// A copy destination cannot hold every cell.
    #[error("destination holds {available} cells, {required} required")]
    DestinationTooSmall { available: usize, required: usize },

    /// A grid cannot have columns without rows.
    #[error("a grid with zero rows cannot have {columns} columns")]
    ShapeInvariant { columns: usize },

    /// The operation would take an axis count outside the capacity policy.
    #[error("{axis} count {requested} outside the permitted range {min}..={}",
            .max.map_or_else(|| String::from("unbounded"), |m| m.to_string()))]
    CapacityViolation {
        axis: Axis,
        requested: usize,
        min: usize,
        max: Option<usize>,
    },
}

impl GridError {
    /// Returns `true` if this error is a capacity-policy violation.
    ///
    /// Capacity failures are a subtype of argument failure: they are raised
    /// by the same pipeline, at the same point, but callers sometimes want to
    /// distinguish them (e.g. to grow a bounded grid differently).
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::CapacityViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_marker() {
        let err = GridError::CapacityViolation {
            axis: Axis::Row,
            requested: 9,
            min: 0,
            max: Some(4),
        };
        assert!(err.is_capacity());

        let err = GridError::IndexOutOfRange {
            axis: Axis::Column,
            index: 3,
            len: 3,
        };
        assert!(!err.is_capacity());
    }

    #[test]
    fn test_display_names_axis() {
        let err = GridError::IndexOutOfRange {
            axis: Axis::Row,
            index: 5,
            len: 2,
        };
        assert_eq!(err.to_string(), "row index 5 out of range for length 2");
    }

    #[test]
    fn test_display_unbounded_capacity() {
        let err = GridError::CapacityViolation {
            axis: Axis::Column,
            requested: 1,
            min: 2,
            max: None,
        };
        assert_eq!(
            err.to_string(),
            "column count 1 outside the permitted range 2..=unbounded"
        );
    }
}
