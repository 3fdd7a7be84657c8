//! Axis selection and transposition: the direction dispatcher.
//!
//! Every structural operation on the grid is implemented once, row-oriented.
//! The column-oriented entry points are derived mechanically: transpose the
//! content into row-major orientation, run the row primitive, transpose back.
//! This keeps a single tested algorithm per operation:
//!
//! ```text
//! op_column(args) == transpose(op_row(transpose(args)))
//! ```
//!
//! Single-cell and single-line operations do not transpose; they use [`Axis`]
//! only to select which axis the 1-D slice runs along.

use std::fmt;

/// Selects which axis an operation's index and count parameters address.
///
/// Supplied per call; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Indices address rows; lines run left-to-right.
    Row,
    /// Indices address columns; lines run top-to-bottom.
    Column,
}

impl Axis {
    /// The orthogonal axis.
    #[inline]
    pub fn cross(self) -> Axis {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }

    /// The number of lines along this axis for a `rows x cols` extent.
    #[inline]
    pub fn len_of(self, rows: usize, cols: usize) -> usize {
        match self {
            Axis::Row => rows,
            Axis::Column => cols,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// Transposes a row-major rectangle into column-major orientation.
///
/// The input must be rectangular; the caller (the validator pipeline)
/// guarantees it. An empty input transposes to an empty output, as does a
/// rectangle whose lines are empty, so the `rows == 0 implies cols == 0`
/// invariant holds on both sides.
pub fn transpose<T: Clone>(lines: &[Vec<T>]) -> Vec<Vec<T>> {
    let cross = lines.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(cross);
    for j in 0..cross {
        let mut line = Vec::with_capacity(lines.len());
        for row in lines {
            line.push(row[j].clone());
        }
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross() {
        assert_eq!(Axis::Row.cross(), Axis::Column);
        assert_eq!(Axis::Column.cross(), Axis::Row);
    }

    #[test]
    fn test_len_of() {
        assert_eq!(Axis::Row.len_of(3, 7), 3);
        assert_eq!(Axis::Column.len_of(3, 7), 7);
    }

    #[test]
    fn test_transpose_rectangle() {
        let rows = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let cols = transpose(&rows);
        assert_eq!(cols, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    }

    #[test]
    fn test_transpose_involution() {
        let rows = vec![vec!['a', 'b'], vec!['c', 'd'], vec!['e', 'f']];
        assert_eq!(transpose(&transpose(&rows)), rows);
    }

    #[test]
    fn test_transpose_empty() {
        let rows: Vec<Vec<u8>> = Vec::new();
        assert!(transpose(&rows).is_empty());

        // Rows of zero width collapse to no columns
        let rows: Vec<Vec<u8>> = vec![Vec::new(), Vec::new()];
        assert!(transpose(&rows).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Axis::Row.to_string(), "row");
        assert_eq!(Axis::Column.to_string(), "column");
    }
}
