//! The validator pipeline.
//!
//! Every public operation runs its arguments through the grid's validator
//! before the store is touched. The validator sees the pre-mutation state
//! (shape plus capacity policy) and either returns `Ok` or fails with a
//! descriptive [`GridError`], in which case the grid is left unmodified.
//!
//! Validators are injected at construction and can be swapped wholesale for
//! test doubles or alternate policies. [`GridValidator::create_for`] produces
//! a fresh, correctly scoped validator when a grid is duplicated, so derived
//! grids inherit validation semantics without sharing state.
//!
//! Column-count bounds are enforced only while rows exist: a grid with zero
//! rows has zero columns by invariant and trivially satisfies the policy.

use crate::axis::Axis;
use crate::capacity::Capacity;
use crate::error::{GridError, Result};
use crate::store::Shape;

/// Pre-mutation state handed to every validator method.
#[derive(Debug, Clone, Copy)]
pub struct ValidateCx<'a> {
    /// The grid's extent before the operation.
    pub shape: Shape,
    /// The grid's capacity policy.
    pub capacity: &'a Capacity,
}

/// Pre-condition checks for every operation category.
///
/// One method per category; plural array-shape arguments are passed as line
/// slices. Implementations must be read-only: a validator never mutates and
/// never observes a partially applied operation.
pub trait GridValidator<T>: Send + Sync {
    /// Validates initial rectangular content (jaggedness and capacity).
    fn validate_construct(&self, cx: &ValidateCx<'_>, rows: &[Vec<T>]) -> Result<()>;

    /// Validates read access to `count` lines along `axis` starting at `at`.
    ///
    /// Single-cell access is validated as a span of length one on each axis.
    fn validate_get(&self, cx: &ValidateCx<'_>, axis: Axis, at: usize, count: usize) -> Result<()>;

    /// Validates replacing `lines.len()` full lines in place starting at `at`.
    fn validate_set(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        lines: &[Vec<T>],
    ) -> Result<()>;

    /// Validates inserting `lines` at `at` (valid range `0..=len`).
    fn validate_insert(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        lines: &[Vec<T>],
    ) -> Result<()>;

    /// Validates replace-then-append starting at `at`.
    fn validate_overwrite(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        lines: &[Vec<T>],
    ) -> Result<()>;

    /// Validates moving the block `[from, from + count)` to `to`, where `to`
    /// indexes the sequence with the block already removed.
    fn validate_move(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<()>;

    /// Validates removing `count` lines starting at `at`.
    fn validate_remove(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        count: usize,
    ) -> Result<()>;

    /// Validates a resize target.
    fn validate_adjust_length(&self, cx: &ValidateCx<'_>, rows: usize, cols: usize) -> Result<()>;

    /// Validates wholesale replacement content.
    fn validate_reset(&self, cx: &ValidateCx<'_>, rows: &[Vec<T>]) -> Result<()>;

    /// Validates a bulk copy into a destination of `available` cells.
    fn validate_copy_to(&self, cx: &ValidateCx<'_>, available: usize) -> Result<()>;

    /// Creates a fresh validator scoped to a derived grid.
    fn create_for(&self, target: &ValidateCx<'_>) -> Box<dyn GridValidator<T>>;
}

/// The default validator: index ranges, rectangular shape, capacity policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidator;

impl StandardValidator {
    /// Checks that every line has the expected orthogonal length.
    ///
    /// When rows are inserted into an empty grid, the first line establishes
    /// the column count and the rest must agree with it.
    fn check_lines<T>(&self, cx: &ValidateCx<'_>, axis: Axis, lines: &[Vec<T>]) -> Result<()> {
        let expected = match axis {
            Axis::Row if cx.shape.rows == 0 => lines.first().map_or(0, Vec::len),
            Axis::Row => cx.shape.cols,
            Axis::Column => cx.shape.rows,
        };
        for (index, line) in lines.iter().enumerate() {
            if line.len() != expected {
                return Err(GridError::Jagged {
                    index,
                    found: line.len(),
                    expected,
                });
            }
        }
        Ok(())
    }

    fn check_span(&self, axis: Axis, at: usize, count: usize, len: usize) -> Result<()> {
        if at.checked_add(count).is_none_or(|end| end > len) {
            if count == 1 {
                return Err(GridError::IndexOutOfRange {
                    axis,
                    index: at,
                    len,
                });
            }
            return Err(GridError::SpanOutOfRange {
                axis,
                at,
                count,
                len,
            });
        }
        Ok(())
    }

    /// Capacity check for the axis count an operation would produce.
    ///
    /// The orthogonal column bound applies only while rows exist.
    fn check_result_counts(
        &self,
        cx: &ValidateCx<'_>,
        new_rows: usize,
        new_cols: usize,
    ) -> Result<()> {
        cx.capacity.check_rows(new_rows)?;
        if new_rows > 0 {
            cx.capacity.check_columns(new_cols)?;
        }
        Ok(())
    }
}

impl<T> GridValidator<T> for StandardValidator {
    fn validate_construct(&self, cx: &ValidateCx<'_>, rows: &[Vec<T>]) -> Result<()> {
        self.check_lines(cx, Axis::Row, rows)?;
        // Construction grows an undersized extent up to the minimum, so only
        // the clamped shape has to fit the policy.
        let rows_n = cx.shape.rows.max(cx.capacity.min_rows());
        let cols_n = cx.shape.cols.max(cx.capacity.min_columns());
        self.check_result_counts(cx, rows_n, cols_n)
    }

    fn validate_get(&self, cx: &ValidateCx<'_>, axis: Axis, at: usize, count: usize) -> Result<()> {
        self.check_span(axis, at, count, cx.shape.len_of(axis))
    }

    fn validate_set(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        lines: &[Vec<T>],
    ) -> Result<()> {
        self.check_span(axis, at, lines.len(), cx.shape.len_of(axis))?;
        self.check_lines(cx, axis, lines)
    }

    fn validate_insert(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        lines: &[Vec<T>],
    ) -> Result<()> {
        let len = cx.shape.len_of(axis);
        if at > len {
            return Err(GridError::InsertOutOfRange { axis, at, len });
        }
        self.check_lines(cx, axis, lines)?;
        match axis {
            Axis::Row => {
                let new_cols = if cx.shape.rows == 0 {
                    lines.first().map_or(0, Vec::len)
                } else {
                    cx.shape.cols
                };
                self.check_result_counts(cx, cx.shape.rows + lines.len(), new_cols)
            }
            Axis::Column => {
                // Inserting columns into a grid without rows leaves it empty.
                let new_cols = if cx.shape.rows == 0 {
                    0
                } else {
                    cx.shape.cols + lines.len()
                };
                self.check_result_counts(cx, cx.shape.rows, new_cols)
            }
        }
    }

    fn validate_overwrite(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        lines: &[Vec<T>],
    ) -> Result<()> {
        let len = cx.shape.len_of(axis);
        if at > len {
            return Err(GridError::InsertOutOfRange { axis, at, len });
        }
        self.check_lines(cx, axis, lines)?;
        let new_len = len.max(at + lines.len());
        match axis {
            Axis::Row => {
                let new_cols = if cx.shape.rows == 0 {
                    lines.first().map_or(0, Vec::len)
                } else {
                    cx.shape.cols
                };
                self.check_result_counts(cx, new_len, new_cols)
            }
            Axis::Column => {
                let new_cols = if cx.shape.rows == 0 { 0 } else { new_len };
                self.check_result_counts(cx, cx.shape.rows, new_cols)
            }
        }
    }

    fn validate_move(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        from: usize,
        to: usize,
        count: usize,
    ) -> Result<()> {
        let len = cx.shape.len_of(axis);
        self.check_span(axis, from, count, len)?;
        // The destination is an insertion point in the sequence with the
        // block removed.
        if to > len - count {
            return Err(GridError::InsertOutOfRange {
                axis,
                at: to,
                len: len - count,
            });
        }
        Ok(())
    }

    fn validate_remove(
        &self,
        cx: &ValidateCx<'_>,
        axis: Axis,
        at: usize,
        count: usize,
    ) -> Result<()> {
        let len = cx.shape.len_of(axis);
        self.check_span(axis, at, count, len)?;
        match axis {
            Axis::Row => {
                let new_rows = cx.shape.rows - count;
                self.check_result_counts(cx, new_rows, cx.shape.cols)
            }
            Axis::Column => self.check_result_counts(cx, cx.shape.rows, cx.shape.cols - count),
        }
    }

    fn validate_adjust_length(&self, cx: &ValidateCx<'_>, rows: usize, cols: usize) -> Result<()> {
        if rows == 0 && cols > 0 {
            return Err(GridError::ShapeInvariant { columns: cols });
        }
        self.check_result_counts(cx, rows, cols)
    }

    fn validate_reset(&self, cx: &ValidateCx<'_>, rows: &[Vec<T>]) -> Result<()> {
        // Replacement content defines its own shape; validate as if empty.
        let fresh = ValidateCx {
            shape: Shape { rows: 0, cols: 0 },
            capacity: cx.capacity,
        };
        self.check_lines(&fresh, Axis::Row, rows)?;
        let new_cols = rows.first().map_or(0, Vec::len);
        self.check_result_counts(cx, rows.len(), new_cols)
    }

    fn validate_copy_to(&self, cx: &ValidateCx<'_>, available: usize) -> Result<()> {
        let required = cx.shape.cell_count();
        if available < required {
            return Err(GridError::DestinationTooSmall {
                available,
                required,
            });
        }
        Ok(())
    }

    fn create_for(&self, _target: &ValidateCx<'_>) -> Box<dyn GridValidator<T>> {
        Box::new(StandardValidator)
    }
}
