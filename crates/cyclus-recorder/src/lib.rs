//! Typed row recording and pluggable backend fan-out.
//!
//! Core Types:
//! - [`Datum`] / [`DatumValue`]: a single output row, built with an owned
//!   builder chain and stamped with the owning simulation's UUID.
//! - [`BackendContract`]: the trait every output sink implements.
//! - [`MemoryBackend`]: an in-process `BackendContract` used by tests and
//!   embedders without a database dependency.
//! - [`Recorder`]: batches `Datum`s and fans them out to registered
//!   backends, detaching any backend that fails.

mod backend;
mod datum;
mod memory_backend;
mod recorder;

pub use backend::{BackendContract, QueryCondition};
pub use datum::{Datum, DatumValue};
pub use memory_backend::MemoryBackend;
pub use recorder::{Recorder, DEFAULT_DUMP_COUNT};
