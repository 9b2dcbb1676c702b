use cyclus_core::Time;
use std::fmt;

/// When radioactive decay is applied to Material compositions. The kernel
/// itself does not implement decay physics (the nuclide mass table and
/// decay engine are out of scope); this only threads the mode through to
/// `Info.DecayMode` and to whichever archetype consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecayMode {
    #[default]
    Never,
    Manual,
    Lazy,
}

impl fmt::Display for DecayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecayMode::Never => "never",
            DecayMode::Manual => "manual",
            DecayMode::Lazy => "lazy",
        };
        write!(f, "{s}")
    }
}

/// The scheduler's configuration, the kernel's equivalent of the parsed
/// `<control>` block (§2.1 AMBIENT STACK; §6 since the XML/JSON parser is
/// out of scope, embedders construct this directly).
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub duration: Time,
    pub dt: Time,
    pub decay_mode: DecayMode,
    pub seed: u64,
    /// `--warn-as-error` (§7): promotes all recorded warnings to hard
    /// failures. There is no CLI here to parse the flag, so it is exposed
    /// directly on the config.
    pub warn_as_error: bool,
}

impl SchedulerConfig {
    pub fn new(duration: Time, dt: Time) -> Self {
        Self {
            duration,
            dt,
            decay_mode: DecayMode::Never,
            seed: 0,
            warn_as_error: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_decay_mode(mut self, mode: DecayMode) -> Self {
        self.decay_mode = mode;
        self
    }

    pub fn warn_as_error(mut self, on: bool) -> Self {
        self.warn_as_error = on;
        self
    }
}
