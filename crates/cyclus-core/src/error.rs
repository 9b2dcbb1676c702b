/// The closed set of error kinds the kernel itself raises (§7).
///
/// Archetype callbacks (out of scope) may raise any `anyhow::Error`; this
/// enum is reserved for invariant violations the kernel detects directly —
/// a negative extraction, a missing registry entry, a lifecycle violation,
/// a backend failure, an interface-query mismatch, or a malformed scenario.
///
/// `Display` always renders the kind before the message, mirroring the
/// original's fixed `"cyclus error: "` prefix on every thrown message.
#[derive(thiserror::Error, Debug)]
pub enum KernelError {
    /// A numeric or quantity invariant was violated (e.g. extracting more
    /// than a resource holds).
    #[error("cyclus error: value error: {0}")]
    Value(String),

    /// A name was not found in a registry (prototype, recipe, package).
    #[error("cyclus error: key error: {0}")]
    Key(String),

    /// An operation was attempted while an agent or resource was in the
    /// wrong lifecycle state.
    #[error("cyclus error: state error: {0}")]
    State(String),

    /// A backend failed to durably record a batch.
    #[error("cyclus error: io error: {0}")]
    Io(String),

    /// An interface query (capability cast) failed against an incompatible
    /// agent.
    #[error("cyclus error: cast error: {0}")]
    Cast(String),

    /// An input scenario failed schema validation.
    #[error("cyclus error: validation error: {0}")]
    Validation(String),
}

impl KernelError {
    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }
    pub fn key(msg: impl Into<String>) -> Self {
        Self::Key(msg.into())
    }
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
    pub fn cast(msg: impl Into<String>) -> Self {
        Self::Cast(msg.into())
    }
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short machine-readable tag for the error kind, used by the
    /// recorder's warning channel and by `RunFailure` reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "ValueError",
            Self::Key(_) => "KeyError",
            Self::State(_) => "StateError",
            Self::Io(_) => "IOError",
            Self::Cast(_) => "CastError",
            Self::Validation(_) => "ValidationError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_fixed_prefix_and_kind() {
        let err = KernelError::value("negative extraction");
        assert_eq!(err.kind(), "ValueError");
        assert!(err.to_string().starts_with("cyclus error: value error:"));
    }
}
