use crate::backend::QueryCondition;
use crate::{BackendContract, Datum};
use cyclus_core::KernelError;
use std::collections::HashMap;

/// An in-process row store implementing [`BackendContract`].
///
/// Not a stand-in for the concrete SQLite/HDF5 backends (those are out of
/// scope for the kernel) — it exists purely to exercise the contract in
/// the kernel's own test suite and for embedders who want a fast,
/// round-trippable backend before wiring up a real one.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: HashMap<&'static str, Vec<Datum>>,
    closed: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows recorded for a given title, in insertion order.
    pub fn rows(&self, title: &str) -> &[Datum] {
        self.rows.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl BackendContract for MemoryBackend {
    fn notify(&mut self, batch: &[Datum]) -> Result<(), KernelError> {
        if self.closed {
            return Err(KernelError::io("notify called on a closed backend"));
        }
        for datum in batch {
            self.rows.entry(datum.title()).or_default().push(datum.clone());
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), KernelError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), KernelError> {
        self.closed = true;
        Ok(())
    }

    fn query(&self, title: &str, conditions: &[QueryCondition]) -> Result<Vec<Datum>, KernelError> {
        Ok(self
            .rows(title)
            .iter()
            .filter(|datum| {
                conditions.iter().all(|cond| {
                    datum
                        .values()
                        .iter()
                        .any(|(name, value)| *name == cond.column && *value == cond.value)
                })
            })
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_then_query_round_trips_a_row() {
        let mut backend = MemoryBackend::new();
        let datum = Datum::new("AgentExit").val("AgentId", 1i64).val("ExitTime", 3i64);
        backend.notify(std::slice::from_ref(&datum)).unwrap();
        let found = backend
            .query("AgentExit", &[QueryCondition::eq("AgentId", 1i64)])
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn notify_after_close_fails() {
        let mut backend = MemoryBackend::new();
        backend.close().unwrap();
        let datum = Datum::new("Foo");
        assert!(backend.notify(std::slice::from_ref(&datum)).is_err());
    }
}
