use crate::Datum;
use cyclus_core::KernelError;

/// A simple equality condition over a named column, used by [`BackendContract::query`].
#[derive(Debug, Clone)]
pub struct QueryCondition {
    pub column: &'static str,
    pub value: crate::DatumValue,
}

impl QueryCondition {
    pub fn eq(column: &'static str, value: impl Into<crate::DatumValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// The contract every output sink must satisfy (§4.7).
///
/// A backend may reorder rows only within a single [`notify`](Self::notify)
/// batch and only if it preserves per-title order; cross-title ordering
/// need not be preserved. `notify` must not block the producer longer than
/// the time it takes to write one batch — a backend wanting to do slow I/O
/// should hand batches to its own background thread and return quickly.
pub trait BackendContract {
    /// Receive a batch of finalized records. Responsible for its own schema
    /// inference on first sighting of each title.
    fn notify(&mut self, batch: &[Datum]) -> Result<(), KernelError>;

    /// Flush pending I/O.
    fn flush(&mut self) -> Result<(), KernelError>;

    /// Final flush and resource release.
    fn close(&mut self) -> Result<(), KernelError>;

    /// Optional: used by tests and the resume/restart pathway. Default
    /// implementation reports the backend as non-queryable.
    fn query(&self, title: &str, _conditions: &[QueryCondition]) -> Result<Vec<Datum>, KernelError> {
        Err(KernelError::io(format!(
            "backend does not support querying title '{title}'"
        )))
    }

    /// A short name for logging when a backend is detached after failure.
    fn name(&self) -> &str {
        "backend"
    }
}
