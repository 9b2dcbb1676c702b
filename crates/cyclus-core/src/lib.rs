//! Shared identifiers, numeric type aliases, and error kinds for the cyclus
//! simulation kernel.
//!
//! This crate has no knowledge of agents, resources, or scheduling — it is
//! the foundation every other kernel crate builds on.
#![allow(dead_code)]

mod error;
mod id;

pub use error::KernelError;
pub use id::ID;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Discrete simulation time, in `dt`-sized steps since the epoch of the run.
pub type Time = u64;
/// A resource's object id: stable across every split/absorb of its lineage.
pub type ObjId = u64;
/// A resource's state id: unique across the whole simulation, bumped on
/// every observable mutation.
pub type StateId = u64;
/// Globally unique, monotonically increasing agent id.
pub type AgentId = u64;
/// Interned id of a Composition (Material) or Quality string (Product).
pub type QualId = u64;
/// Transaction id assigned to a single executed Trade.
pub type TransactionId = u64;
/// Resource quantity, in the resource's own units. Always non-negative.
pub type Quantity = f64;
/// A bid or request's relative desirability; negative means "refuse".
pub type Preference = f64;

/// Tolerance used for every quantity comparison in the kernel: two
/// quantities within this distance of each other are considered equal.
///
/// Mirrors the original's `eps_rsrc` (~1e-6 in the resource's own units).
pub const EPS_RSRC: Quantity = 1e-6;

/// True if `a` and `b` are equal within [`EPS_RSRC`].
pub fn quantity_eq(a: Quantity, b: Quantity) -> bool {
    (a - b).abs() <= EPS_RSRC
}

/// Compensated (Kahan) summation, ported from the original's
/// `CycArithmetic::KahanSum`. Plain `Iterator::sum` drifts past
/// [`EPS_RSRC`] when conservation checks fold many small quantities;
/// this keeps the running error term bounded.
pub fn kahan_sum<I: IntoIterator<Item = Quantity>>(values: I) -> Quantity {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for value in values {
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Random instance generation, used by kernel-internal tests and any
/// embedder that wants to fuzz scenario construction.
pub trait Arbitrary {
    fn random() -> Self;
}

/// Implemented by anything with a process-unique [`ID`].
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// RUNTIME UTILITIES (diagnostics feature)
// ============================================================================
/// Initialize dual logging (terminal + file) with a timestamped log file.
///
/// Creates a `logs/` directory and writes DEBUG level to file, INFO to
/// terminal.
#[cfg(feature = "diagnostics")]
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Global flag consulted between scheduler phases to implement `Stop()`.
#[cfg(feature = "diagnostics")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Register a Ctrl+C handler that requests a graceful stop (checked between
/// phases, per §5 cancellation semantics) rather than exiting immediately.
#[cfg(feature = "diagnostics")]
pub fn install_interrupt_handler() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, stopping after the current phase");
            INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });
}

/// Whether a graceful stop was requested via [`install_interrupt_handler`].
#[cfg(feature = "diagnostics")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}
/// No-op when the `diagnostics` feature is disabled.
#[cfg(not(feature = "diagnostics"))]
pub fn interrupted() -> bool {
    false
}
