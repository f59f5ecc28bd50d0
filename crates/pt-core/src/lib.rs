//! Shared primitives used across Portico crates.

pub mod notice;

use core::fmt;

pub use notice::NoopNotifier;
pub use notice::Notice;
pub use notice::Notifier;

/// Result alias used across the workspace.
pub type HostResult<T> = Result<T, HostError>;

/// Top-level error type carried across crate boundaries.
///
/// Component crates keep their own typed error enums and convert into this shape when a failure
/// has to travel up to the embedding host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub code: &'static str,
    pub message: String,
}

impl HostError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for HostError {}
