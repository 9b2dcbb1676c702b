use crate::{BackendContract, Datum};
use cyclus_core::KernelError;

/// Default batch size before the buffer is flushed to backends.
pub const DEFAULT_DUMP_COUNT: usize = 10_000;

/// Collects [`Datum`] records produced anywhere in the kernel and fans them
/// out to registered [`BackendContract`] instances in fixed-size batches
/// (§4.1).
///
/// The Recorder is single-producer: it is only ever called from the
/// scheduler's thread, never concurrently.
pub struct Recorder {
    sim_id: uuid::Uuid,
    dump_count: usize,
    buffer: Vec<Datum>,
    backends: Vec<Box<dyn BackendContract>>,
}

impl Recorder {
    /// Creates a recorder for a fresh simulation, generating its UUID.
    pub fn new() -> Self {
        Self {
            sim_id: uuid::Uuid::now_v7(),
            dump_count: DEFAULT_DUMP_COUNT,
            buffer: Vec::new(),
            backends: Vec::new(),
        }
    }

    /// The simulation's unique identifier, stamped onto every Datum.
    pub fn sim_id(&self) -> uuid::Uuid {
        self.sim_id
    }

    /// Controls flush granularity. A value of 0 means flush on every
    /// `record` call.
    pub fn set_dump_count(&mut self, n: usize) {
        self.dump_count = n;
    }

    pub fn register_backend(&mut self, backend: Box<dyn BackendContract>) {
        self.backends.push(backend);
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Finalizes and enqueues a Datum. O(1) besides the occasional flush.
    pub fn record(&mut self, mut datum: Datum) {
        datum.stamp(self.sim_id);
        self.buffer.push(datum);
        if self.dump_count == 0 || self.buffer.len() >= self.dump_count {
            self.flush();
        }
    }

    /// Notifies every backend with the buffered batch. A backend whose
    /// `notify` fails is detached and the error is surfaced as a warning
    /// Datum; buffered records for the other backends still flush.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.buffer);
        let mut failures = Vec::new();
        self.backends.retain_mut(|backend| match backend.notify(&batch) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("backend '{}' failed during notify: {err}; detaching", backend.name());
                failures.push((backend.name().to_owned(), err));
                false
            }
        });
        for (name, err) in failures {
            self.buffer.push(
                Datum::new("Warnings")
                    .val("Backend", name)
                    .val("Message", err.to_string()),
            );
        }
        if !self.buffer.is_empty() {
            // Warning rows from this flush still need a home; recurse once
            // more so they reach the survivors instead of lingering.
            let residual = std::mem::take(&mut self.buffer);
            for backend in self.backends.iter_mut() {
                let _ = backend.notify(&residual);
            }
        }
    }

    /// Flushes and detaches all backends, calling `close` on each.
    pub fn close(&mut self) {
        self.flush();
        for backend in self.backends.iter_mut() {
            if let Err(err) = backend.close() {
                log::warn!("backend '{}' failed to close cleanly: {err}", backend.name());
            }
        }
        self.backends.clear();
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if !self.buffer.is_empty() || !self.backends.is_empty() {
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    fn with_memory_backend() -> (Recorder, *const ()) {
        let mut recorder = Recorder::new();
        recorder.set_dump_count(2);
        recorder.register_backend(Box::new(MemoryBackend::new()));
        (recorder, std::ptr::null())
    }

    #[test]
    fn record_stamps_sim_id_and_flushes_at_dump_count() {
        let (mut recorder, _) = with_memory_backend();
        recorder.record(Datum::new("AgentEntry").val("AgentId", 1i64));
        assert_eq!(recorder.buffer.len(), 1);
        recorder.record(Datum::new("AgentEntry").val("AgentId", 2i64));
        // dump_count=2 triggers an automatic flush.
        assert_eq!(recorder.buffer.len(), 0);
    }

    #[test]
    fn close_flushes_and_detaches_every_backend() {
        let (mut recorder, _) = with_memory_backend();
        recorder.record(Datum::new("AgentEntry").val("AgentId", 1i64));
        recorder.close();
        assert_eq!(recorder.backend_count(), 0);
    }

    struct FailingBackend;
    impl BackendContract for FailingBackend {
        fn notify(&mut self, _batch: &[Datum]) -> Result<(), KernelError> {
            Err(KernelError::io("disk full"))
        }
        fn flush(&mut self) -> Result<(), KernelError> {
            Ok(())
        }
        fn close(&mut self) -> Result<(), KernelError> {
            Ok(())
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn a_failing_backend_is_detached_but_others_keep_receiving_batches() {
        let mut recorder = Recorder::new();
        recorder.set_dump_count(1);
        recorder.register_backend(Box::new(FailingBackend));
        recorder.register_backend(Box::new(MemoryBackend::new()));
        recorder.record(Datum::new("AgentEntry").val("AgentId", 1i64));
        assert_eq!(recorder.backend_count(), 1);
    }
}
