//! The row store: a trusted, row-major rectangle of items.
//!
//! `RowStore` performs no bounds or shape checking of its own; every index
//! and every bulk argument is validated by the pipeline before the store is
//! touched. This keeps the store a pure data structure.
//!
//! The one rule the store does maintain is the shape invariant: a store with
//! zero rows reports zero columns, and the column count is re-derived
//! whenever the row set is replaced wholesale or emptied.

use crate::axis::Axis;

/// The extent of a grid: row count and column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl Shape {
    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// `true` when the grid holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// The number of lines along the given axis.
    #[inline]
    pub fn len_of(&self, axis: Axis) -> usize {
        axis.len_of(self.rows, self.cols)
    }
}

/// Row-major storage with structural primitives.
#[derive(Debug, Clone)]
pub(crate) struct RowStore<T> {
    rows: Vec<Vec<T>>,
    cols: usize,
}

impl<T: Clone> RowStore<T> {
    /// An empty store.
    pub(crate) fn empty() -> Self {
        Self {
            rows: Vec::new(),
            cols: 0,
        }
    }

    /// Builds a store from rectangular content (already validated).
    pub(crate) fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        Self { rows, cols }
    }

    pub(crate) fn shape(&self) -> Shape {
        Shape {
            rows: self.rows.len(),
            cols: self.cols,
        }
    }

    pub(crate) fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub(crate) fn cell(&self, row: usize, col: usize) -> &T {
        &self.rows[row][col]
    }

    /// Replaces a cell, returning the previous value.
    pub(crate) fn set_cell(&mut self, row: usize, col: usize, value: T) -> T {
        std::mem::replace(&mut self.rows[row][col], value)
    }

    /// Detached copies of `count` rows starting at `at`.
    pub(crate) fn row_range(&self, at: usize, count: usize) -> Vec<Vec<T>> {
        self.rows[at..at + count].to_vec()
    }

    /// A detached copy of one column.
    pub(crate) fn column(&self, col: usize) -> Vec<T> {
        self.rows.iter().map(|row| row[col].clone()).collect()
    }

    /// Replaces one full row, returning the previous content.
    pub(crate) fn set_row(&mut self, row: usize, values: Vec<T>) -> Vec<T> {
        std::mem::replace(&mut self.rows[row], values)
    }

    /// Replaces one full column, returning the previous content.
    pub(crate) fn set_column(&mut self, col: usize, values: Vec<T>) -> Vec<T> {
        self.rows
            .iter_mut()
            .zip(values)
            .map(|(row, value)| std::mem::replace(&mut row[col], value))
            .collect()
    }

    /// Inserts rows at `at`. An insertion into an empty store establishes the
    /// column count.
    pub(crate) fn insert_rows(&mut self, at: usize, rows: Vec<Vec<T>>) {
        if self.rows.is_empty() {
            self.cols = rows.first().map_or(0, Vec::len);
        }
        self.rows.splice(at..at, rows);
    }

    /// Removes `count` rows starting at `at`, returning them. Emptying the
    /// store resets the column count.
    pub(crate) fn remove_rows(&mut self, at: usize, count: usize) -> Vec<Vec<T>> {
        let removed: Vec<Vec<T>> = self.rows.splice(at..at + count, std::iter::empty()).collect();
        if self.rows.is_empty() {
            self.cols = 0;
        }
        removed
    }

    /// Moves the block `[from, from + count)` so that it starts at `to`,
    /// where `to` indexes the sequence with the block already removed.
    pub(crate) fn move_rows(&mut self, from: usize, to: usize, count: usize) {
        let block: Vec<Vec<T>> = self.rows.splice(from..from + count, std::iter::empty()).collect();
        self.rows.splice(to..to, block);
    }

    /// Replaces the rows `[at, at + rows.len())` that exist and appends the
    /// remainder. Returns the rows that were replaced.
    pub(crate) fn overwrite_rows(&mut self, at: usize, rows: Vec<Vec<T>>) -> Vec<Vec<T>> {
        if self.rows.is_empty() {
            self.cols = rows.first().map_or(0, Vec::len);
        }
        let replace_len = rows.len().min(self.rows.len() - at);
        self.rows
            .splice(at..at + replace_len, rows)
            .collect()
    }

    /// Replaces `count` rows starting at `at` in place, returning the old
    /// rows. The replacement block must have exactly `count` rows.
    pub(crate) fn set_row_range(&mut self, at: usize, rows: Vec<Vec<T>>) -> Vec<Vec<T>> {
        let count = rows.len();
        self.rows.splice(at..at + count, rows).collect()
    }

    /// Replaces the entire content, returning the old rows. The column count
    /// is re-derived from the new content.
    pub(crate) fn replace_all(&mut self, rows: Vec<Vec<T>>) -> Vec<Vec<T>> {
        self.cols = rows.first().map_or(0, Vec::len);
        std::mem::replace(&mut self.rows, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RowStore<i32> {
        RowStore::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]])
    }

    #[test]
    fn test_shape() {
        let s = store();
        assert_eq!(s.shape(), Shape { rows: 3, cols: 2 });
        assert_eq!(s.shape().cell_count(), 6);
        assert!(!s.shape().is_empty());
        assert_eq!(s.shape().len_of(Axis::Row), 3);
        assert_eq!(s.shape().len_of(Axis::Column), 2);
    }

    #[test]
    fn test_empty_store_has_no_columns() {
        let s: RowStore<i32> = RowStore::empty();
        assert_eq!(s.shape(), Shape { rows: 0, cols: 0 });
    }

    #[test]
    fn test_cell_access() {
        let mut s = store();
        assert_eq!(*s.cell(1, 0), 3);
        let old = s.set_cell(1, 0, 30);
        assert_eq!(old, 3);
        assert_eq!(*s.cell(1, 0), 30);
    }

    #[test]
    fn test_insert_rows_mid() {
        let mut s = store();
        s.insert_rows(1, vec![vec![7, 8]]);
        assert_eq!(s.rows(), &[vec![1, 2], vec![7, 8], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_insert_into_empty_establishes_columns() {
        let mut s: RowStore<i32> = RowStore::empty();
        s.insert_rows(0, vec![vec![1, 2, 3]]);
        assert_eq!(s.shape(), Shape { rows: 1, cols: 3 });
    }

    #[test]
    fn test_remove_rows_and_collapse() {
        let mut s = store();
        let removed = s.remove_rows(0, 2);
        assert_eq!(removed, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(s.shape(), Shape { rows: 1, cols: 2 });

        s.remove_rows(0, 1);
        assert_eq!(s.shape(), Shape { rows: 0, cols: 0 });
    }

    #[test]
    fn test_move_rows_forward_and_back() {
        let mut s = store();
        s.move_rows(0, 1, 1);
        assert_eq!(s.rows(), &[vec![3, 4], vec![1, 2], vec![5, 6]]);
        s.move_rows(1, 0, 1);
        assert_eq!(s.rows(), &[vec![1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_move_block() {
        let mut s = RowStore::from_rows(vec![vec![0], vec![1], vec![2], vec![3]]);
        s.move_rows(0, 2, 2);
        assert_eq!(s.rows(), &[vec![2], vec![3], vec![0], vec![1]]);
    }

    #[test]
    fn test_overwrite_inside() {
        let mut s = store();
        let old = s.overwrite_rows(0, vec![vec![9, 9]]);
        assert_eq!(old, vec![vec![1, 2]]);
        assert_eq!(s.rows(), &[vec![9, 9], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_overwrite_straddling_appends() {
        let mut s = store();
        let old = s.overwrite_rows(2, vec![vec![7, 7], vec![8, 8]]);
        assert_eq!(old, vec![vec![5, 6]]);
        assert_eq!(
            s.rows(),
            &[vec![1, 2], vec![3, 4], vec![7, 7], vec![8, 8]]
        );
    }

    #[test]
    fn test_overwrite_at_end_is_append() {
        let mut s = store();
        let old = s.overwrite_rows(3, vec![vec![7, 7]]);
        assert!(old.is_empty());
        assert_eq!(s.shape().rows, 4);
    }

    #[test]
    fn test_set_row_range() {
        let mut s = store();
        let old = s.set_row_range(1, vec![vec![30, 40], vec![50, 60]]);
        assert_eq!(old, vec![vec![3, 4], vec![5, 6]]);
        assert_eq!(s.rows(), &[vec![1, 2], vec![30, 40], vec![50, 60]]);
    }

    #[test]
    fn test_column_and_set_column() {
        let mut s = store();
        assert_eq!(s.column(1), vec![2, 4, 6]);
        let old = s.set_column(1, vec![20, 40, 60]);
        assert_eq!(old, vec![2, 4, 6]);
        assert_eq!(s.column(1), vec![20, 40, 60]);
    }

    #[test]
    fn test_replace_all() {
        let mut s = store();
        let old = s.replace_all(vec![vec![9, 9, 9]]);
        assert_eq!(old.len(), 3);
        assert_eq!(s.shape(), Shape { rows: 1, cols: 3 });

        s.replace_all(Vec::new());
        assert_eq!(s.shape(), Shape { rows: 0, cols: 0 });
    }
}
