//! The change-notification engine.
//!
//! Every mutation is described twice: once as an internal [`Effect`] (what
//! the operation does to the row set) and once as a list of [`GridChange`]
//! descriptors (what subscribers are told). The translation between the two
//! is the granularity decision table in [`decompose`], a single function from
//! `(effect, granularity)` to signal descriptors.
//!
//! Two independent signal families surround each mutation:
//!
//! - **Attribute signals**: one `changing`/`changed` pair per observable
//!   property (the cell accessor, row count, column count, cell count,
//!   emptiness). These fire only when [`PropertyNotify::Enabled`] and only
//!   for properties whose value actually changes.
//! - **Collection signals**: `collection_changing`/`collection_changed`,
//!   carrying one [`GridChange`] per emission. How many emissions a single
//!   logical operation produces is governed by [`ChangeGranularity`].
//!
//! The `changing` phase is computed from and emitted on the pre-mutation
//! snapshot; the `changed` phase on the post-mutation snapshot. Both carry
//! the same descriptors.

use tabula_core::Signal;

use crate::store::Shape;

/// Whether attribute-change signals fire at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyNotify {
    /// Attribute signals are suppressed.
    Disabled,
    /// Attribute signals fire for real transitions.
    #[default]
    Enabled,
}

/// How a logical multi-element operation is decomposed into discrete
/// collection-change signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeGranularity {
    /// No collection signal is emitted.
    None,
    /// Exactly one signal per call; mixed operations collapse to Reset.
    Once,
    /// Alias semantics of [`ChangeGranularity::Once`].
    Simple,
    /// One signal per call for pure operations; mixed operations still
    /// collapse to Reset.
    #[default]
    Single,
    /// One signal per affected element; mixed operations emit discrete
    /// Replace and Insert signals instead of collapsing.
    Multi,
}

impl ChangeGranularity {
    /// `true` when a mixed replace-plus-append operation must be reported as
    /// a single Reset instead of discrete signals.
    pub(crate) fn collapses_mixed(self) -> bool {
        !matches!(self, ChangeGranularity::Multi)
    }
}

/// The action a collection signal reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridChangeKind {
    Insert,
    Remove,
    Replace,
    Move,
    Reset,
}

/// One collection-change signal payload.
///
/// Payloads carry detached row copies; subscribers never observe live
/// storage. Column-oriented structural changes are reported in this same
/// row-major vocabulary: rows keep their identity while their length
/// changes, so they surface as `Replace` (or `Reset`), never as row
/// `Insert`/`Remove`/`Move`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridChange<T> {
    /// Rows were inserted at `at`.
    Insert { at: usize, new_rows: Vec<Vec<T>> },
    /// Rows were removed; `at` is their position in the pre-mutation grid.
    Remove { at: usize, old_rows: Vec<Vec<T>> },
    /// Rows in place were replaced.
    Replace {
        at: usize,
        old_rows: Vec<Vec<T>>,
        new_rows: Vec<Vec<T>>,
    },
    /// A contiguous block moved from `from` to `to` (post-removal index).
    Move {
        from: usize,
        to: usize,
        rows: Vec<Vec<T>>,
    },
    /// The entire old content was replaced by the entire new content.
    Reset {
        old_rows: Vec<Vec<T>>,
        new_rows: Vec<Vec<T>>,
    },
}

impl<T> GridChange<T> {
    /// The action kind of this change.
    pub fn kind(&self) -> GridChangeKind {
        match self {
            GridChange::Insert { .. } => GridChangeKind::Insert,
            GridChange::Remove { .. } => GridChangeKind::Remove,
            GridChange::Replace { .. } => GridChangeKind::Replace,
            GridChange::Move { .. } => GridChangeKind::Move,
            GridChange::Reset { .. } => GridChangeKind::Reset,
        }
    }

    /// Start index of the outgoing content, when the change has one.
    pub fn old_start_index(&self) -> Option<usize> {
        match self {
            GridChange::Remove { at, .. } | GridChange::Replace { at, .. } => Some(*at),
            GridChange::Move { from, .. } => Some(*from),
            GridChange::Reset { .. } => Some(0),
            GridChange::Insert { .. } => None,
        }
    }

    /// Start index of the incoming content, when the change has one.
    pub fn new_start_index(&self) -> Option<usize> {
        match self {
            GridChange::Insert { at, .. } | GridChange::Replace { at, .. } => Some(*at),
            GridChange::Move { to, .. } => Some(*to),
            GridChange::Reset { .. } => Some(0),
            GridChange::Remove { .. } => None,
        }
    }

    /// The outgoing rows, when the change carries them.
    pub fn old_rows(&self) -> Option<&[Vec<T>]> {
        match self {
            GridChange::Remove { old_rows, .. }
            | GridChange::Replace { old_rows, .. }
            | GridChange::Reset { old_rows, .. } => Some(old_rows),
            GridChange::Move { rows, .. } => Some(rows),
            GridChange::Insert { .. } => None,
        }
    }

    /// The incoming rows, when the change carries them.
    pub fn new_rows(&self) -> Option<&[Vec<T>]> {
        match self {
            GridChange::Insert { new_rows, .. }
            | GridChange::Replace { new_rows, .. }
            | GridChange::Reset { new_rows, .. } => Some(new_rows),
            GridChange::Move { rows, .. } => Some(rows),
            GridChange::Remove { .. } => None,
        }
    }
}

/// Internal description of what a mutation does to the row set, produced by
/// the grid before decomposition.
///
/// Invariant upheld by the grid: a mixed replace-plus-append is only
/// described as `ReplaceAppend` when the granularity keeps discrete signals
/// (`Multi`); under collapsing granularities the grid builds `Reset`
/// directly, because the collapse needs full before/after content.
#[derive(Debug, Clone)]
pub(crate) enum Effect<T> {
    Insert {
        at: usize,
        rows: Vec<Vec<T>>,
    },
    Remove {
        at: usize,
        rows: Vec<Vec<T>>,
    },
    Replace {
        at: usize,
        old: Vec<Vec<T>>,
        new: Vec<Vec<T>>,
    },
    Move {
        from: usize,
        to: usize,
        rows: Vec<Vec<T>>,
    },
    /// Overwrite that straddles the end: rows `[at, at + replaced.len())`
    /// replaced, the rest appended.
    ReplaceAppend {
        at: usize,
        old: Vec<Vec<T>>,
        replaced: Vec<Vec<T>>,
        appended: Vec<Vec<T>>,
    },
    /// A column-axis structural change: every row is replaced in place.
    ColumnReplace {
        old: Vec<Vec<T>>,
        new: Vec<Vec<T>>,
    },
    Reset {
        old: Vec<Vec<T>>,
        new: Vec<Vec<T>>,
    },
}

/// The granularity decision table: maps one effect to the list of signals to
/// emit, in emission order.
pub(crate) fn decompose<T: Clone>(
    effect: Effect<T>,
    granularity: ChangeGranularity,
) -> Vec<GridChange<T>> {
    use ChangeGranularity as G;

    if granularity == G::None {
        return Vec::new();
    }

    match effect {
        Effect::Insert { at, rows } => match granularity {
            G::Multi => rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| GridChange::Insert {
                    at: at + i,
                    new_rows: vec![row],
                })
                .collect(),
            _ => vec![GridChange::Insert { at, new_rows: rows }],
        },

        Effect::Remove { at, rows } => match granularity {
            G::Multi => rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| GridChange::Remove {
                    at: at + i,
                    old_rows: vec![row],
                })
                .collect(),
            _ => vec![GridChange::Remove { at, old_rows: rows }],
        },

        Effect::Replace { at, old, new } => match granularity {
            G::Multi => old
                .into_iter()
                .zip(new)
                .enumerate()
                .map(|(i, (old_row, new_row))| GridChange::Replace {
                    at: at + i,
                    old_rows: vec![old_row],
                    new_rows: vec![new_row],
                })
                .collect(),
            _ => vec![GridChange::Replace {
                at,
                old_rows: old,
                new_rows: new,
            }],
        },

        Effect::Move { from, to, rows } => match granularity {
            G::Multi => rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| GridChange::Move {
                    from: from + i,
                    to: to + i,
                    rows: vec![row],
                })
                .collect(),
            _ => vec![GridChange::Move { from, to, rows }],
        },

        Effect::ReplaceAppend {
            at,
            old,
            replaced,
            appended,
        } => {
            // Collapsing granularities never produce this effect; the grid
            // pre-collapses them to Reset.
            debug_assert!(granularity == G::Multi);
            let append_base = at + old.len();
            old.into_iter()
                .zip(replaced)
                .enumerate()
                .map(|(i, (old_row, new_row))| GridChange::Replace {
                    at: at + i,
                    old_rows: vec![old_row],
                    new_rows: vec![new_row],
                })
                .chain(appended.into_iter().enumerate().map(|(j, row)| {
                    GridChange::Insert {
                        at: append_base + j,
                        new_rows: vec![row],
                    }
                }))
                .collect()
        }

        Effect::ColumnReplace { old, new } => match granularity {
            // Rows keep their identity but change length; under the
            // single-signal granularities the whole-grid replacement is what
            // a subscriber can apply, and Once/Simple collapse it to Reset.
            G::Once | G::Simple => vec![GridChange::Reset {
                old_rows: old,
                new_rows: new,
            }],
            G::Single => vec![GridChange::Replace {
                at: 0,
                old_rows: old,
                new_rows: new,
            }],
            _ => old
                .into_iter()
                .zip(new)
                .enumerate()
                .map(|(i, (old_row, new_row))| GridChange::Replace {
                    at: i,
                    old_rows: vec![old_row],
                    new_rows: vec![new_row],
                })
                .collect(),
        },

        Effect::Reset { old, new } => vec![GridChange::Reset {
            old_rows: old,
            new_rows: new,
        }],
    }
}

/// The signals a grid exposes.
///
/// Subscribers connect to individual fields; each is an independent
/// multi-subscriber broadcast. The `*_changing` signals carry the outgoing
/// value and fire before the mutation; the `*_changed` signals carry the
/// incoming value and fire after it.
///
/// A subscriber may read the grid from inside a callback. Mutating the same
/// grid from inside a callback is unsupported and produces undefined signal
/// ordering.
pub struct GridSignals<T: 'static> {
    /// The cell accessor is about to change (any mutation).
    pub cells_changing: Signal<()>,
    /// The cell accessor changed.
    pub cells_changed: Signal<()>,
    /// Row count is about to change; payload is the outgoing count.
    pub row_count_changing: Signal<usize>,
    /// Row count changed; payload is the incoming count.
    pub row_count_changed: Signal<usize>,
    /// Column count is about to change; payload is the outgoing count.
    pub column_count_changing: Signal<usize>,
    /// Column count changed; payload is the incoming count.
    pub column_count_changed: Signal<usize>,
    /// Total cell count is about to change; payload is the outgoing count.
    pub cell_count_changing: Signal<usize>,
    /// Total cell count changed; payload is the incoming count.
    pub cell_count_changed: Signal<usize>,
    /// Emptiness is about to flip; payload is the outgoing state.
    pub is_empty_changing: Signal<bool>,
    /// Emptiness flipped; payload is the incoming state.
    pub is_empty_changed: Signal<bool>,
    /// A collection change is about to be applied.
    pub collection_changing: Signal<GridChange<T>>,
    /// A collection change was applied.
    pub collection_changed: Signal<GridChange<T>>,
}

impl<T: 'static> Default for GridSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> GridSignals<T> {
    /// Creates a new set of signals with no connections.
    pub fn new() -> Self {
        Self {
            cells_changing: Signal::new(),
            cells_changed: Signal::new(),
            row_count_changing: Signal::new(),
            row_count_changed: Signal::new(),
            column_count_changing: Signal::new(),
            column_count_changed: Signal::new(),
            cell_count_changing: Signal::new(),
            cell_count_changed: Signal::new(),
            is_empty_changing: Signal::new(),
            is_empty_changed: Signal::new(),
            collection_changing: Signal::new(),
            collection_changed: Signal::new(),
        }
    }

    /// `true` if either collection channel has subscribers.
    pub(crate) fn has_collection_subscribers(&self) -> bool {
        self.collection_changing.connection_count() > 0
            || self.collection_changed.connection_count() > 0
    }

    /// Emits the `changing` half of the attribute channel for a shape
    /// transition, payloads taken from the pre-mutation snapshot.
    pub(crate) fn emit_attributes_changing(&self, old: Shape, new: Shape) {
        self.cells_changing.emit(());
        if old.rows != new.rows {
            self.row_count_changing.emit(old.rows);
        }
        if old.cols != new.cols {
            self.column_count_changing.emit(old.cols);
        }
        if old.cell_count() != new.cell_count() {
            self.cell_count_changing.emit(old.cell_count());
        }
        if old.is_empty() != new.is_empty() {
            self.is_empty_changing.emit(old.is_empty());
        }
    }

    /// Emits the `changed` half of the attribute channel, payloads taken
    /// from the post-mutation snapshot.
    pub(crate) fn emit_attributes_changed(&self, old: Shape, new: Shape) {
        self.cells_changed.emit(());
        if old.rows != new.rows {
            self.row_count_changed.emit(new.rows);
        }
        if old.cols != new.cols {
            self.column_count_changed.emit(new.cols);
        }
        if old.cell_count() != new.cell_count() {
            self.cell_count_changed.emit(new.cell_count());
        }
        if old.is_empty() != new.is_empty() {
            self.is_empty_changed.emit(new.is_empty());
        }
    }
}
