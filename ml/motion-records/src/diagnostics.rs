//! Diagnostic sinks for warnings and hard failures.
//!
//! Validators never log through a global. They report every soft
//! degradation and every rejection to a [`DiagnosticSink`] passed in by the
//! caller, so independent validations can be observed in isolation.

use std::sync::{Mutex, PoisonError};

use tracing::{error, warn};

use crate::error::RecordError;

/// A single diagnostic emitted during record construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Recoverable degradation: construction continued.
    Warning {
        /// Field the warning refers to.
        field: String,
        /// Human-readable message.
        message: String,
    },
    /// Hard failure: construction was aborted with this error.
    Error(RecordError),
}

impl Diagnostic {
    /// Returns `true` for warnings.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }
}

/// Write-only channel for construction diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Reports a recoverable degradation on `field`.
    fn warning(&self, field: &str, message: &str);

    /// Reports an error that is about to abort construction.
    fn error(&self, error: &RecordError);
}

/// Sink that forwards diagnostics to `tracing`.
///
/// This is the sink used by the plain `build()` methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warning(&self, field: &str, message: &str) {
        warn!(field = field, "{message}");
    }

    fn error(&self, err: &RecordError) {
        error!(field = err.field().unwrap_or_default(), "{err}");
    }
}

/// Sink that keeps every diagnostic in memory.
///
/// # Example
///
/// ```
/// use motion_records::{CollectingSink, DiagnosticSink};
///
/// let sink = CollectingSink::new();
/// sink.warning("fps", "Invalid fps value (-5.0).");
/// assert_eq!(sink.warnings().len(), 1);
/// assert!(sink.errors().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all diagnostics in emission order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Returns the messages of all warnings in emission order.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|d| match d {
                Diagnostic::Warning { message, .. } => Some(message.clone()),
                Diagnostic::Error(_) => None,
            })
            .collect()
    }

    /// Returns all reported errors in emission order.
    #[must_use]
    pub fn errors(&self) -> Vec<RecordError> {
        self.lock()
            .iter()
            .filter_map(|d| match d {
                Diagnostic::Error(err) => Some(err.clone()),
                Diagnostic::Warning { .. } => None,
            })
            .collect()
    }

    /// Returns `true` if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards all collected diagnostics.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn warning(&self, field: &str, message: &str) {
        self.lock().push(Diagnostic::Warning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn error(&self, err: &RecordError) {
        self.lock().push(Diagnostic::Error(err.clone()));
    }
}

/// Reports `err` to `sink` and hands it back for propagation.
pub(crate) fn reject(sink: &dyn DiagnosticSink, err: RecordError) -> RecordError {
    sink.error(&err);
    err
}
