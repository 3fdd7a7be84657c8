//! The grid: an observable, validated, rectangular collection.
//!
//! `Grid<T>` owns a rectangle of items and exposes row- and column-oriented
//! accessors and mutators. Every mutation flows through the same pipeline:
//! validator (read-only, against the pre-mutation state), `changing` signals,
//! store mutation, `changed` signals. A failed validation returns early and
//! leaves the grid byte-for-byte unchanged.
//!
//! # Concurrency
//!
//! The grid uses interior mutability and is `Send + Sync`, but it is designed
//! for a single owner mutating synchronously; concurrent writers must be
//! serialized externally. Subscribers run synchronously on the mutating
//! thread with no internal lock held, so they may read the grid from inside
//! a callback. Mutating the same grid from inside a callback is unsupported
//! and produces undefined signal ordering.

use std::cmp::Ordering;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tabula_core::{PerfSpan, Property};

use crate::axis::{Axis, transpose};
use crate::capacity::Capacity;
use crate::error::Result;
use crate::notify::{
    ChangeGranularity, Effect, GridChange, GridSignals, PropertyNotify, decompose,
};
use crate::store::{RowStore, Shape};
use crate::validate::{GridValidator, StandardValidator, ValidateCx};

/// Factory used to populate newly created cells, called with the cell's
/// final `(row, column)` position. Shrinking never invokes it.
pub type CellFactory<T> = Arc<dyn Fn(usize, usize) -> T + Send + Sync>;

/// Construction-time configuration.
///
/// The notification settings remain mutable afterwards through
/// [`Grid::set_granularity`] and [`Grid::set_property_notify`]; the capacity
/// policy is fixed for the grid's lifetime.
#[derive(Debug, Clone, Default)]
pub struct GridOptions {
    /// Minimum/maximum row and column counts.
    pub capacity: Capacity,
    /// Collection-change decomposition strategy.
    pub granularity: ChangeGranularity,
    /// Whether attribute-change signals fire.
    pub property_notify: PropertyNotify,
}

/// An observable two-dimensional collection.
///
/// Invariant: a grid with zero rows has zero columns; otherwise every row
/// has exactly `column_count()` cells. Rows handed out by accessors are
/// detached copies; no caller ever holds live storage across a mutation.
///
/// # Example
///
/// ```
/// use tabula::{ChangeGranularity, Grid, GridChangeKind};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let grid = Grid::new(2, 3, |r, c| r * 10 + c).unwrap();
/// grid.set_granularity(ChangeGranularity::Multi);
///
/// let inserts = Arc::new(AtomicUsize::new(0));
/// let counter = inserts.clone();
/// grid.signals().collection_changed.connect(move |change| {
///     if change.kind() == GridChangeKind::Insert {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }
/// });
///
/// grid.insert_rows(1, vec![vec![90, 91, 92], vec![80, 81, 82]]).unwrap();
/// assert_eq!(grid.row_count(), 4);
/// assert_eq!(inserts.load(Ordering::SeqCst), 2);
/// ```
pub struct Grid<T: Clone + Send + Sync + 'static> {
    store: RwLock<RowStore<T>>,
    factory: CellFactory<T>,
    validator: Box<dyn GridValidator<T>>,
    capacity: Capacity,
    granularity: Property<ChangeGranularity>,
    property_notify: Property<PropertyNotify>,
    signals: GridSignals<T>,
}

impl<T: Clone + Send + Sync + 'static> std::fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.store.read();
        f.debug_struct("Grid")
            .field("rows", &store.shape().rows)
            .field("columns", &store.shape().cols)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Grid<T> {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Creates a grid of the given extent, populating every cell from the
    /// factory.
    pub fn new<F>(rows: usize, cols: usize, factory: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        Self::with_options(rows, cols, factory, GridOptions::default())
    }

    /// Creates a grid of the given extent with explicit options.
    ///
    /// An extent below the capacity minimum is grown to it (factory-filled);
    /// an extent above the maximum is rejected.
    pub fn with_options<F>(rows: usize, cols: usize, factory: F, options: GridOptions) -> Result<Self>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        let factory: CellFactory<T> = Arc::new(factory);
        let content: Vec<Vec<T>> = (0..rows)
            .map(|r| (0..cols).map(|c| factory(r, c)).collect())
            .collect();
        let shape = Shape { rows, cols };
        Self::construct(content, shape, factory, options, Box::new(StandardValidator))
    }

    /// Creates a grid from existing rectangular content.
    ///
    /// The factory is still required: growth operations use it later.
    pub fn from_rows<F>(rows: Vec<Vec<T>>, factory: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        Self::from_rows_with_options(rows, factory, GridOptions::default())
    }

    /// Creates a grid from existing rectangular content with explicit
    /// options.
    pub fn from_rows_with_options<F>(
        rows: Vec<Vec<T>>,
        factory: F,
        options: GridOptions,
    ) -> Result<Self>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        let shape = Shape {
            rows: rows.len(),
            cols: rows.first().map_or(0, Vec::len),
        };
        Self::construct(rows, shape, Arc::new(factory), options, Box::new(StandardValidator))
    }

    /// Creates a grid with a caller-supplied validator.
    ///
    /// The validator replaces [`StandardValidator`] wholesale; it is consulted
    /// for this construction and for every later operation.
    pub fn with_validator<F>(
        rows: usize,
        cols: usize,
        factory: F,
        options: GridOptions,
        validator: Box<dyn GridValidator<T>>,
    ) -> Result<Self>
    where
        F: Fn(usize, usize) -> T + Send + Sync + 'static,
    {
        let factory: CellFactory<T> = Arc::new(factory);
        let content: Vec<Vec<T>> = (0..rows)
            .map(|r| (0..cols).map(|c| factory(r, c)).collect())
            .collect();
        let shape = Shape { rows, cols };
        Self::construct(content, shape, factory, options, validator)
    }

    fn construct(
        content: Vec<Vec<T>>,
        nominal: Shape,
        factory: CellFactory<T>,
        options: GridOptions,
        validator: Box<dyn GridValidator<T>>,
    ) -> Result<Self> {
        {
            let cx = ValidateCx {
                shape: nominal,
                capacity: &options.capacity,
            };
            validator.validate_construct(&cx, &content)?;
        }

        let mut rows = content;
        let target_rows = nominal.rows.max(options.capacity.min_rows());
        let mut target_cols = nominal.cols.max(options.capacity.min_columns());
        if target_rows == 0 {
            target_cols = 0;
        }
        for (r, row) in rows.iter_mut().enumerate() {
            for c in row.len()..target_cols {
                row.push(factory(r, c));
            }
        }
        for r in rows.len()..target_rows {
            rows.push((0..target_cols).map(|c| factory(r, c)).collect());
        }

        tracing::debug!(
            target: "tabula::grid",
            rows = target_rows,
            cols = target_cols,
            "constructed grid"
        );
        Ok(Self {
            store: RwLock::new(RowStore::from_rows(rows)),
            factory,
            validator,
            capacity: options.capacity,
            granularity: Property::new(options.granularity),
            property_notify: Property::new(options.property_notify),
            signals: GridSignals::new(),
        })
    }

    /// Creates an independent copy: same content, capacity, settings and
    /// factory, a fresh validator from [`GridValidator::create_for`], and no
    /// subscribers.
    pub fn duplicate(&self) -> Grid<T> {
        let rows = self.to_rows();
        let shape = Shape {
            rows: rows.len(),
            cols: rows.first().map_or(0, Vec::len),
        };
        let validator = self.validator.create_for(&ValidateCx {
            shape,
            capacity: &self.capacity,
        });
        Grid {
            store: RwLock::new(RowStore::from_rows(rows)),
            factory: self.factory.clone(),
            validator,
            capacity: self.capacity.clone(),
            granularity: Property::new(self.granularity.get()),
            property_notify: Property::new(self.property_notify.get()),
            signals: GridSignals::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Configuration and observation
    // -------------------------------------------------------------------------

    /// The grid's signals; connect here for change notification.
    pub fn signals(&self) -> &GridSignals<T> {
        &self.signals
    }

    /// The active collection-change granularity.
    pub fn granularity(&self) -> ChangeGranularity {
        self.granularity.get()
    }

    /// Changes the collection-change granularity; affects only future
    /// operations.
    pub fn set_granularity(&self, granularity: ChangeGranularity) {
        if self.granularity.set(granularity) {
            tracing::trace!(target: "tabula::notify", ?granularity, "granularity changed");
        }
    }

    /// Whether attribute-change signals fire.
    pub fn property_notify(&self) -> PropertyNotify {
        self.property_notify.get()
    }

    /// Changes attribute-signal emission; affects only future operations.
    pub fn set_property_notify(&self, notify: PropertyNotify) {
        if self.property_notify.set(notify) {
            tracing::trace!(target: "tabula::notify", ?notify, "property notification changed");
        }
    }

    /// The capacity policy supplied at construction.
    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    /// The current extent.
    pub fn shape(&self) -> Shape {
        self.store.read().shape()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.shape().rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.shape().cols
    }

    /// Total number of cells (`row_count * column_count`).
    pub fn cell_count(&self) -> usize {
        self.shape().cell_count()
    }

    /// `true` when the grid holds no rows.
    pub fn is_empty(&self) -> bool {
        self.shape().is_empty()
    }

    // -------------------------------------------------------------------------
    // Access
    // -------------------------------------------------------------------------

    /// Returns a copy of one cell.
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let store = self.store.read();
        let cx = self.cx(store.shape());
        self.validator.validate_get(&cx, Axis::Row, row, 1)?;
        self.validator.validate_get(&cx, Axis::Column, col, 1)?;
        Ok(store.cell(row, col).clone())
    }

    /// Returns a detached copy of one line along the given axis.
    pub fn line(&self, axis: Axis, index: usize) -> Result<Vec<T>> {
        let store = self.store.read();
        self.validator
            .validate_get(&self.cx(store.shape()), axis, index, 1)?;
        Ok(match axis {
            Axis::Row => store.rows()[index].clone(),
            Axis::Column => store.column(index),
        })
    }

    /// Returns a detached copy of one row.
    pub fn row(&self, index: usize) -> Result<Vec<T>> {
        self.line(Axis::Row, index)
    }

    /// Returns a detached copy of one column.
    pub fn column(&self, index: usize) -> Result<Vec<T>> {
        self.line(Axis::Column, index)
    }

    /// Returns detached copies of `count` lines along the given axis.
    pub fn lines(&self, axis: Axis, at: usize, count: usize) -> Result<Vec<Vec<T>>> {
        let store = self.store.read();
        self.validator
            .validate_get(&self.cx(store.shape()), axis, at, count)?;
        Ok(match axis {
            Axis::Row => store.row_range(at, count),
            Axis::Column => (at..at + count).map(|j| store.column(j)).collect(),
        })
    }

    /// Returns detached copies of `count` rows starting at `at`.
    pub fn rows_range(&self, at: usize, count: usize) -> Result<Vec<Vec<T>>> {
        self.lines(Axis::Row, at, count)
    }

    /// Returns detached copies of `count` columns starting at `at`.
    pub fn columns_range(&self, at: usize, count: usize) -> Result<Vec<Vec<T>>> {
        self.lines(Axis::Column, at, count)
    }

    /// A read guard over the rows (no copying).
    ///
    /// Holding the guard across a mutation deadlocks; take copies via
    /// [`Grid::to_rows`] when the borrow must outlive other calls.
    pub fn rows(&self) -> impl Deref<Target = [Vec<T>]> + '_ {
        RwLockReadGuard::map(self.store.read(), |store| store.rows())
    }

    /// Detached copies of every row.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.store.read().rows().to_vec()
    }

    /// Copies every cell into `dest` in row-major (`Axis::Row`) or
    /// column-major (`Axis::Column`) order. `dest` must hold at least
    /// [`Grid::cell_count`] cells; extra trailing cells are left untouched.
    pub fn copy_to(&self, dest: &mut [T], order: Axis) -> Result<()> {
        let store = self.store.read();
        let shape = store.shape();
        self.validator
            .validate_copy_to(&self.cx(shape), dest.len())?;
        let mut i = 0;
        match order {
            Axis::Row => {
                for row in store.rows() {
                    for cell in row {
                        dest[i] = cell.clone();
                        i += 1;
                    }
                }
            }
            Axis::Column => {
                for c in 0..shape.cols {
                    for r in 0..shape.rows {
                        dest[i] = store.cell(r, c).clone();
                        i += 1;
                    }
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Cell and line mutation
    // -------------------------------------------------------------------------

    /// Replaces one cell, returning the previous value.
    pub fn set(&self, row: usize, col: usize, value: T) -> Result<T> {
        let shape = self.shape();
        {
            // Position checks first, so the row can be materialized safely.
            let cx = self.cx(shape);
            self.validator.validate_get(&cx, Axis::Row, row, 1)?;
            self.validator.validate_get(&cx, Axis::Column, col, 1)?;
        }
        let old_row = self.store.read().rows()[row].clone();
        let mut new_row = old_row.clone();
        new_row[col] = value.clone();
        self.validator
            .validate_set(&self.cx(shape), Axis::Row, row, std::slice::from_ref(&new_row))?;
        let changes = if self.wants_collection() {
            decompose(
                Effect::Replace {
                    at: row,
                    old: vec![old_row],
                    new: vec![new_row],
                },
                self.granularity.get(),
            )
        } else {
            Vec::new()
        };
        let mut previous = None;
        self.commit("set", shape, shape, changes, |store| {
            previous = Some(store.set_cell(row, col, value));
        });
        Ok(previous.unwrap())
    }

    /// Replaces one full line along the given axis, returning the previous
    /// content.
    pub fn set_line(&self, axis: Axis, index: usize, values: Vec<T>) -> Result<Vec<T>> {
        let shape = self.shape();
        self.validator
            .validate_set(&self.cx(shape), axis, index, std::slice::from_ref(&values))?;
        match axis {
            Axis::Row => {
                let changes = if self.wants_collection() {
                    let old_row = self.store.read().rows()[index].clone();
                    decompose(
                        Effect::Replace {
                            at: index,
                            old: vec![old_row],
                            new: vec![values.clone()],
                        },
                        self.granularity.get(),
                    )
                } else {
                    Vec::new()
                };
                let mut previous = None;
                self.commit("set_row", shape, shape, changes, |store| {
                    previous = Some(store.set_row(index, values));
                });
                Ok(previous.unwrap())
            }
            Axis::Column => {
                let changes = if self.wants_collection() {
                    let old = self.to_rows();
                    let mut new = old.clone();
                    for (r, v) in values.iter().enumerate() {
                        new[r][index] = v.clone();
                    }
                    decompose(Effect::ColumnReplace { old, new }, self.granularity.get())
                } else {
                    Vec::new()
                };
                let mut previous = None;
                self.commit("set_column", shape, shape, changes, |store| {
                    previous = Some(store.set_column(index, values));
                });
                Ok(previous.unwrap())
            }
        }
    }

    /// Replaces one full row, returning the previous content.
    pub fn set_row(&self, index: usize, values: Vec<T>) -> Result<Vec<T>> {
        self.set_line(Axis::Row, index, values)
    }

    /// Replaces one full column, returning the previous content.
    pub fn set_column(&self, index: usize, values: Vec<T>) -> Result<Vec<T>> {
        self.set_line(Axis::Column, index, values)
    }

    /// Replaces `lines.len()` full lines in place starting at `at`.
    pub fn set_lines(&self, axis: Axis, at: usize, lines: Vec<Vec<T>>) -> Result<()> {
        let shape = self.shape();
        self.validator
            .validate_set(&self.cx(shape), axis, at, &lines)?;
        if lines.is_empty() {
            return Ok(());
        }
        match axis {
            Axis::Row => {
                let changes = if self.wants_collection() {
                    let old = self.store.read().row_range(at, lines.len());
                    decompose(
                        Effect::Replace {
                            at,
                            old,
                            new: lines.clone(),
                        },
                        self.granularity.get(),
                    )
                } else {
                    Vec::new()
                };
                self.commit("set_rows", shape, shape, changes, move |store| {
                    store.set_row_range(at, lines);
                });
            }
            Axis::Column => {
                let changes = if self.wants_collection() {
                    let old = self.to_rows();
                    let mut new = old.clone();
                    for (offset, line) in lines.iter().enumerate() {
                        for (r, v) in line.iter().enumerate() {
                            new[r][at + offset] = v.clone();
                        }
                    }
                    decompose(Effect::ColumnReplace { old, new }, self.granularity.get())
                } else {
                    Vec::new()
                };
                self.commit("set_columns", shape, shape, changes, move |store| {
                    for (offset, line) in lines.into_iter().enumerate() {
                        store.set_column(at + offset, line);
                    }
                });
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Structural mutation
    // -------------------------------------------------------------------------

    /// Inserts lines at `at` along the given axis.
    pub fn insert_lines(&self, axis: Axis, at: usize, lines: Vec<Vec<T>>) -> Result<()> {
        let shape = self.shape();
        self.validator
            .validate_insert(&self.cx(shape), axis, at, &lines)?;
        if lines.is_empty() {
            return Ok(());
        }
        match axis {
            Axis::Row => {
                let new_shape = Shape {
                    rows: shape.rows + lines.len(),
                    cols: if shape.rows == 0 {
                        lines[0].len()
                    } else {
                        shape.cols
                    },
                };
                let changes = if self.wants_collection() {
                    decompose(
                        Effect::Insert {
                            at,
                            rows: lines.clone(),
                        },
                        self.granularity.get(),
                    )
                } else {
                    Vec::new()
                };
                self.commit("insert_rows", shape, new_shape, changes, move |store| {
                    store.insert_rows(at, lines);
                });
                Ok(())
            }
            Axis::Column => {
                if shape.rows == 0 {
                    // Zero-length columns; nothing to store.
                    return Ok(());
                }
                self.column_structural("insert_columns", shape.cols + lines.len(), move |mut t| {
                    t.splice(at..at, lines);
                    t
                });
                Ok(())
            }
        }
    }

    /// Inserts rows at `at`.
    pub fn insert_rows(&self, at: usize, rows: Vec<Vec<T>>) -> Result<()> {
        self.insert_lines(Axis::Row, at, rows)
    }

    /// Inserts columns at `at`; each line is one column, top to bottom.
    pub fn insert_columns(&self, at: usize, columns: Vec<Vec<T>>) -> Result<()> {
        self.insert_lines(Axis::Column, at, columns)
    }

    /// Appends one row.
    pub fn push_row(&self, row: Vec<T>) -> Result<()> {
        let at = self.row_count();
        self.insert_rows(at, vec![row])
    }

    /// Appends one column.
    pub fn push_column(&self, column: Vec<T>) -> Result<()> {
        let at = self.column_count();
        self.insert_columns(at, vec![column])
    }

    /// Removes `count` lines starting at `at`, returning them detached.
    pub fn remove_lines(&self, axis: Axis, at: usize, count: usize) -> Result<Vec<Vec<T>>> {
        let shape = self.shape();
        self.validator
            .validate_remove(&self.cx(shape), axis, at, count)?;
        if count == 0 {
            return Ok(Vec::new());
        }
        match axis {
            Axis::Row => {
                let removed = self.store.read().row_range(at, count);
                let new_shape = Shape {
                    rows: shape.rows - count,
                    cols: if shape.rows == count { 0 } else { shape.cols },
                };
                let changes = if self.wants_collection() {
                    decompose(
                        Effect::Remove {
                            at,
                            rows: removed.clone(),
                        },
                        self.granularity.get(),
                    )
                } else {
                    Vec::new()
                };
                self.commit("remove_rows", shape, new_shape, changes, move |store| {
                    store.remove_rows(at, count);
                });
                Ok(removed)
            }
            Axis::Column => {
                let removed: Vec<Vec<T>> = {
                    let store = self.store.read();
                    (at..at + count).map(|j| store.column(j)).collect()
                };
                self.column_structural("remove_columns", shape.cols - count, move |mut t| {
                    t.drain(at..at + count);
                    t
                });
                Ok(removed)
            }
        }
    }

    /// Removes `count` rows starting at `at`, returning them detached.
    pub fn remove_rows(&self, at: usize, count: usize) -> Result<Vec<Vec<T>>> {
        self.remove_lines(Axis::Row, at, count)
    }

    /// Removes `count` columns starting at `at`, returning them detached.
    pub fn remove_columns(&self, at: usize, count: usize) -> Result<Vec<Vec<T>>> {
        self.remove_lines(Axis::Column, at, count)
    }

    /// Moves the block of `count` lines at `from` so it starts at `to`,
    /// where `to` indexes the sequence with the block already removed.
    ///
    /// Row moves are reported as Move; column moves surface as Replace, since
    /// every row keeps its identity while its content is rearranged.
    pub fn move_lines(&self, axis: Axis, from: usize, to: usize, count: usize) -> Result<()> {
        let shape = self.shape();
        self.validator
            .validate_move(&self.cx(shape), axis, from, to, count)?;
        if count == 0 || from == to {
            return Ok(());
        }
        match axis {
            Axis::Row => {
                let changes = if self.wants_collection() {
                    let rows = self.store.read().row_range(from, count);
                    decompose(Effect::Move { from, to, rows }, self.granularity.get())
                } else {
                    Vec::new()
                };
                self.commit("move_rows", shape, shape, changes, move |store| {
                    store.move_rows(from, to, count);
                });
                Ok(())
            }
            Axis::Column => {
                self.column_structural("move_columns", shape.cols, move |mut t| {
                    let block: Vec<Vec<T>> =
                        t.splice(from..from + count, std::iter::empty()).collect();
                    t.splice(to..to, block);
                    t
                });
                Ok(())
            }
        }
    }

    /// Moves rows; see [`Grid::move_lines`].
    pub fn move_rows(&self, from: usize, to: usize, count: usize) -> Result<()> {
        self.move_lines(Axis::Row, from, to, count)
    }

    /// Moves columns; see [`Grid::move_lines`].
    pub fn move_columns(&self, from: usize, to: usize, count: usize) -> Result<()> {
        self.move_lines(Axis::Column, from, to, count)
    }

    /// Replace-then-append: lines `[at, at + lines.len())` that exist are
    /// replaced, the remainder is appended.
    ///
    /// An overwrite entirely inside the current extent reports Replace; one
    /// starting at the end reports Insert; one straddling the end reports
    /// discrete Replace plus Insert signals under `Multi` and collapses to a
    /// single Reset otherwise.
    pub fn overwrite_lines(&self, axis: Axis, at: usize, lines: Vec<Vec<T>>) -> Result<()> {
        let shape = self.shape();
        self.validator
            .validate_overwrite(&self.cx(shape), axis, at, &lines)?;
        if lines.is_empty() {
            return Ok(());
        }
        match axis {
            Axis::Row => self.overwrite_rows_inner(shape, at, lines),
            Axis::Column => {
                if shape.rows == 0 {
                    return Ok(());
                }
                let new_cols = shape.cols.max(at + lines.len());
                self.column_structural("overwrite_columns", new_cols, move |mut t| {
                    let replace_len = lines.len().min(t.len() - at);
                    t.splice(at..at + replace_len, lines);
                    t
                });
                Ok(())
            }
        }
    }

    fn overwrite_rows_inner(&self, shape: Shape, at: usize, rows: Vec<Vec<T>>) -> Result<()> {
        let k = rows.len();
        let new_shape = Shape {
            rows: shape.rows.max(at + k),
            cols: if shape.rows == 0 {
                rows[0].len()
            } else {
                shape.cols
            },
        };
        let granularity = self.granularity.get();
        let changes = if self.wants_collection() {
            let effect = if at + k <= shape.rows {
                Effect::Replace {
                    at,
                    old: self.store.read().row_range(at, k),
                    new: rows.clone(),
                }
            } else if at == shape.rows {
                Effect::Insert {
                    at,
                    rows: rows.clone(),
                }
            } else if granularity.collapses_mixed() {
                // The collapse needs full before/after content.
                let old_all = self.to_rows();
                let mut new_all = old_all[..at].to_vec();
                new_all.extend(rows.iter().cloned());
                Effect::Reset {
                    old: old_all,
                    new: new_all,
                }
            } else {
                let replaced_count = shape.rows - at;
                Effect::ReplaceAppend {
                    at,
                    old: self.store.read().row_range(at, replaced_count),
                    replaced: rows[..replaced_count].to_vec(),
                    appended: rows[replaced_count..].to_vec(),
                }
            };
            decompose(effect, granularity)
        } else {
            Vec::new()
        };
        self.commit("overwrite_rows", shape, new_shape, changes, move |store| {
            store.overwrite_rows(at, rows);
        });
        Ok(())
    }

    /// Replace-then-append rows; see [`Grid::overwrite_lines`].
    pub fn overwrite_rows(&self, at: usize, rows: Vec<Vec<T>>) -> Result<()> {
        self.overwrite_lines(Axis::Row, at, rows)
    }

    /// Replace-then-append columns; see [`Grid::overwrite_lines`].
    pub fn overwrite_columns(&self, at: usize, columns: Vec<Vec<T>>) -> Result<()> {
        self.overwrite_lines(Axis::Column, at, columns)
    }

    /// Replaces the entire content. Always reported as a single Reset.
    pub fn reset(&self, rows: Vec<Vec<T>>) -> Result<()> {
        let shape = self.shape();
        self.validator.validate_reset(&self.cx(shape), &rows)?;
        let new_shape = Shape {
            rows: rows.len(),
            cols: rows.first().map_or(0, Vec::len),
        };
        let changes = if self.wants_collection() {
            decompose(
                Effect::Reset {
                    old: self.to_rows(),
                    new: rows.clone(),
                },
                self.granularity.get(),
            )
        } else {
            Vec::new()
        };
        self.commit("reset", shape, new_shape, changes, move |store| {
            store.replace_all(rows);
        });
        Ok(())
    }

    /// Removes every row. Equivalent to `reset(Vec::new())`.
    pub fn clear(&self) -> Result<()> {
        self.reset(Vec::new())
    }

    /// Reorders rows by the comparator. Reported as a single Reset.
    pub fn sort_rows_by<F>(&self, mut compare: F) -> Result<()>
    where
        F: FnMut(&[T], &[T]) -> Ordering,
    {
        let shape = self.shape();
        let old = self.to_rows();
        let mut sorted = old.clone();
        sorted.sort_by(|a, b| compare(a, b));
        self.validator.validate_reset(&self.cx(shape), &sorted)?;
        let changes = if self.wants_collection() {
            decompose(
                Effect::Reset {
                    old,
                    new: sorted.clone(),
                },
                self.granularity.get(),
            )
        } else {
            Vec::new()
        };
        self.commit("sort_rows", shape, shape, changes, move |store| {
            store.replace_all(sorted);
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Resizing
    // -------------------------------------------------------------------------

    /// Resizes to exactly `rows x cols`, rejecting targets outside the
    /// capacity policy.
    ///
    /// A change along one axis decomposes like the equivalent insert/remove
    /// (rows) or column-structural replace (columns). When both dimensions
    /// change at once the decompositions cannot be represented independently
    /// and a single Reset is emitted regardless of granularity.
    pub fn adjust_length(&self, rows: usize, cols: usize) -> Result<()> {
        let shape = self.shape();
        self.validator
            .validate_adjust_length(&self.cx(shape), rows, cols)?;
        self.apply_adjust("adjust_length", shape, rows, cols)
    }

    /// Grows up to `rows x cols` if the grid is shorter; never shrinks.
    /// Targets outside the capacity policy are clamped, not rejected.
    pub fn adjust_length_if_short(&self, rows: usize, cols: usize) -> Result<()> {
        let shape = self.shape();
        let rows = self.capacity.clamp_rows(rows.max(shape.rows));
        let cols = self.capacity.clamp_columns(cols.max(shape.cols));
        let cols = if rows == 0 { 0 } else { cols };
        self.validator
            .validate_adjust_length(&self.cx(shape), rows, cols)?;
        self.apply_adjust("adjust_length_if_short", shape, rows, cols)
    }

    /// Shrinks down to `rows x cols` if the grid is longer; never grows.
    /// Targets outside the capacity policy are clamped, not rejected.
    pub fn adjust_length_if_long(&self, rows: usize, cols: usize) -> Result<()> {
        let shape = self.shape();
        let rows = self.capacity.clamp_rows(rows.min(shape.rows));
        let cols = self.capacity.clamp_columns(cols.min(shape.cols));
        let cols = if rows == 0 { 0 } else { cols };
        self.validator
            .validate_adjust_length(&self.cx(shape), rows, cols)?;
        self.apply_adjust("adjust_length_if_long", shape, rows, cols)
    }

    /// Resizes the row count only.
    pub fn adjust_row_count(&self, rows: usize) -> Result<()> {
        self.adjust_length(rows, self.column_count())
    }

    /// Grows the row count if short; clamp-not-fail.
    pub fn adjust_row_count_if_short(&self, rows: usize) -> Result<()> {
        self.adjust_length_if_short(rows, 0)
    }

    /// Shrinks the row count if long; clamp-not-fail.
    pub fn adjust_row_count_if_long(&self, rows: usize) -> Result<()> {
        self.adjust_length_if_long(rows, usize::MAX)
    }

    /// Resizes the column count only.
    pub fn adjust_column_count(&self, cols: usize) -> Result<()> {
        self.adjust_length(self.row_count(), cols)
    }

    /// Grows the column count if short; clamp-not-fail.
    pub fn adjust_column_count_if_short(&self, cols: usize) -> Result<()> {
        self.adjust_length_if_short(0, cols)
    }

    /// Shrinks the column count if long; clamp-not-fail.
    pub fn adjust_column_count_if_long(&self, cols: usize) -> Result<()> {
        self.adjust_length_if_long(usize::MAX, cols)
    }

    fn apply_adjust(
        &self,
        op: &'static str,
        shape: Shape,
        target_rows: usize,
        target_cols: usize,
    ) -> Result<()> {
        let target_cols = if target_rows == 0 { 0 } else { target_cols };
        let new_shape = Shape {
            rows: target_rows,
            cols: target_cols,
        };
        if new_shape == shape {
            return Ok(());
        }

        let granularity = self.granularity.get();
        let wants = self.wants_collection();

        // Growth from empty is a pure insert and shrink-to-empty a pure
        // removal; only a grid that keeps rows on both sides can change both
        // dimensions at once.
        if shape.rows > 0
            && target_rows > 0
            && shape.rows != target_rows
            && shape.cols != target_cols
        {
            let old = self.to_rows();
            let new = resize_content(&old, new_shape, &self.factory);
            let changes = if wants {
                decompose(
                    Effect::Reset {
                        old,
                        new: new.clone(),
                    },
                    granularity,
                )
            } else {
                Vec::new()
            };
            self.commit(op, shape, new_shape, changes, move |store| {
                store.replace_all(new);
            });
            return Ok(());
        }

        if shape.rows != target_rows {
            if target_rows > shape.rows {
                let width = target_cols;
                let added: Vec<Vec<T>> = (shape.rows..target_rows)
                    .map(|r| (0..width).map(|c| (self.factory)(r, c)).collect())
                    .collect();
                let at = shape.rows;
                let changes = if wants {
                    decompose(
                        Effect::Insert {
                            at,
                            rows: added.clone(),
                        },
                        granularity,
                    )
                } else {
                    Vec::new()
                };
                self.commit(op, shape, new_shape, changes, move |store| {
                    store.insert_rows(at, added);
                });
            } else {
                let at = target_rows;
                let count = shape.rows - target_rows;
                let changes = if wants {
                    let removed = self.store.read().row_range(at, count);
                    decompose(Effect::Remove { at, rows: removed }, granularity)
                } else {
                    Vec::new()
                };
                self.commit(op, shape, new_shape, changes, move |store| {
                    store.remove_rows(at, count);
                });
            }
            return Ok(());
        }

        // Column-only change: every row is replaced in place.
        let old = self.to_rows();
        let mut new = old.clone();
        for (r, row) in new.iter_mut().enumerate() {
            if target_cols < shape.cols {
                row.truncate(target_cols);
            } else {
                for c in shape.cols..target_cols {
                    row.push((self.factory)(r, c));
                }
            }
        }
        let changes = if wants {
            decompose(
                Effect::ColumnReplace {
                    old,
                    new: new.clone(),
                },
                granularity,
            )
        } else {
            Vec::new()
        };
        self.commit(op, shape, new_shape, changes, move |store| {
            store.replace_all(new);
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn cx(&self, shape: Shape) -> ValidateCx<'_> {
        ValidateCx {
            shape,
            capacity: &self.capacity,
        }
    }

    /// Collection payloads are computed only when someone will see them.
    fn wants_collection(&self) -> bool {
        self.granularity.get() != ChangeGranularity::None
            && self.signals.has_collection_subscribers()
    }

    /// Applies a column-axis structural operation by transposing, running
    /// the row-oriented edit, and transposing back. Validation has already
    /// happened; the grid is known to have at least one row.
    fn column_structural(
        &self,
        op: &'static str,
        new_cols: usize,
        rebuild: impl FnOnce(Vec<Vec<T>>) -> Vec<Vec<T>>,
    ) {
        let (shape, old) = {
            let store = self.store.read();
            (store.shape(), store.rows().to_vec())
        };
        let new_t = rebuild(transpose(&old));
        let mut new = transpose(&new_t);
        if new.is_empty() && shape.rows > 0 {
            // Transposition cannot represent zero-width rows.
            new = vec![Vec::new(); shape.rows];
        }
        let new_shape = Shape {
            rows: shape.rows,
            cols: new_cols,
        };
        let changes = if self.wants_collection() {
            decompose(
                Effect::ColumnReplace {
                    old,
                    new: new.clone(),
                },
                self.granularity.get(),
            )
        } else {
            Vec::new()
        };
        self.commit(op, shape, new_shape, changes, move |store| {
            store.replace_all(new);
        });
    }

    /// The shared mutation tail: `changing` signals from the pre-mutation
    /// snapshot, the store edit under the write lock, `changed` signals from
    /// the post-mutation snapshot. No lock is held while subscribers run.
    fn commit(
        &self,
        op: &'static str,
        old: Shape,
        new: Shape,
        changes: Vec<GridChange<T>>,
        mutate: impl FnOnce(&mut RowStore<T>),
    ) {
        let _span = PerfSpan::new(op);
        tracing::debug!(
            target: "tabula::grid",
            op,
            old_rows = old.rows,
            old_cols = old.cols,
            new_rows = new.rows,
            new_cols = new.cols,
            signals = changes.len(),
            "applying mutation"
        );

        let notify_attrs = self.property_notify.get() == PropertyNotify::Enabled;
        if notify_attrs {
            self.signals.emit_attributes_changing(old, new);
        }
        for change in &changes {
            self.signals.collection_changing.emit(change.clone());
        }

        {
            let mut store = self.store.write();
            mutate(&mut store);
        }

        if notify_attrs {
            self.signals.emit_attributes_changed(old, new);
        }
        for change in changes {
            self.signals.collection_changed.emit(change);
        }
    }
}

/// Builds the content for a dual-axis resize: surviving cells are kept,
/// new cells come from the factory at their final coordinates.
fn resize_content<T: Clone>(
    old: &[Vec<T>],
    new_shape: Shape,
    factory: &CellFactory<T>,
) -> Vec<Vec<T>> {
    let mut rows: Vec<Vec<T>> = old.iter().take(new_shape.rows).cloned().collect();
    for (r, row) in rows.iter_mut().enumerate() {
        if row.len() > new_shape.cols {
            row.truncate(new_shape.cols);
        } else {
            for c in row.len()..new_shape.cols {
                row.push(factory(r, c));
            }
        }
    }
    for r in rows.len()..new_shape.rows {
        rows.push((0..new_shape.cols).map(|c| factory(r, c)).collect());
    }
    rows
}

static_assertions::assert_impl_all!(Grid<String>: Send, Sync);
