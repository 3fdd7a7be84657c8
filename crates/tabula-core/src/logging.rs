//! Logging and debugging facilities for Tabula.
//!
//! Tabula uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! The constants in [`targets`] and [`span_names`] can be used with
//! `tracing` directives (e.g. `RUST_LOG=tabula::grid=trace`) to filter logs
//! by subsystem.

/// Span names used throughout Tabula for tracing.
pub mod span_names {
    /// Grid mutation span.
    pub const MUTATE: &str = "tabula::mutate";
    /// Validation span.
    pub const VALIDATE: &str = "tabula::validate";
    /// Signal emission span.
    pub const SIGNAL: &str = "tabula::signal";
}

/// Target names for log filtering.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "tabula_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "tabula_core::signal";
    /// Grid operations target.
    pub const GRID: &str = "tabula::grid";
    /// Validator pipeline target.
    pub const VALIDATE: &str = "tabula::validate";
    /// Change-notification engine target.
    pub const NOTIFY: &str = "tabula::notify";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "tabula::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic
        let _span = PerfSpan::new("test_operation");
    }
}
