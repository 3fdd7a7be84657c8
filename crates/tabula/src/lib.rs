//! An observable rectangular grid collection.
//!
//! Tabula provides [`Grid<T>`], a mutable two-dimensional ordered collection
//! with three intertwined responsibilities:
//!
//! - **Shape invariants**: every row has equal length; optional minimum and
//!   maximum row/column counts via [`Capacity`]
//! - **Validation**: a pluggable [`GridValidator`] runs before every mutating
//!   operation; a failed check leaves the grid untouched
//! - **Change notification**: per-attribute and per-collection signals around
//!   every mutation, decomposed according to a configurable
//!   [`ChangeGranularity`]
//!
//! Row-oriented operations are the canonical form; every column-oriented
//! entry point is derived from them by transposition (see [`Axis`]).
//!
//! # Example
//!
//! ```
//! use tabula::{Axis, Grid, GridChangeKind};
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//!
//! // A 2 x 3 grid of strings, default-filled from the factory.
//! let grid = Grid::new(2, 3, |r, c| format!("r{r}c{c}")).unwrap();
//!
//! // Observe collection changes.
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let sink = log.clone();
//! grid.signals().collection_changed.connect(move |change| {
//!     sink.lock().push(change.kind());
//! });
//!
//! grid.push_row(vec!["a".into(), "b".into(), "c".into()]).unwrap();
//! grid.remove_columns(0, 1).unwrap();
//!
//! assert_eq!(grid.shape().rows, 3);
//! assert_eq!(grid.shape().cols, 2);
//! // The row append is an Insert; the column removal surfaces as Replace.
//! assert_eq!(*log.lock(), vec![GridChangeKind::Insert, GridChangeKind::Replace]);
//! ```
//!
//! # Concurrency
//!
//! A grid is `Send + Sync` but designed for a single synchronous owner;
//! concurrent writers must serialize externally. Subscribers run
//! synchronously, in registration order, on the mutating thread; mutating
//! the grid from inside a subscriber callback is unsupported.

mod axis;
mod capacity;
mod error;
mod grid;
mod notify;
mod store;
mod validate;

pub use axis::{Axis, transpose};
pub use capacity::Capacity;
pub use error::{GridError, Result};
pub use grid::{CellFactory, Grid, GridOptions};
pub use notify::{ChangeGranularity, GridChange, GridChangeKind, GridSignals, PropertyNotify};
pub use store::Shape;
pub use validate::{GridValidator, StandardValidator, ValidateCx};

// Re-export the signal primitives so subscribers do not need a separate
// dependency on the core crate.
pub use tabula_core::{ConnectionGuard, ConnectionId, Property, Signal};
