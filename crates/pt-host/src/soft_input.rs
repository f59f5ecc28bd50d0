//! On-screen keyboard adjustment mode of the hosting window.

use core::fmt;
use core::str::FromStr;
use thiserror::Error;

/// Platform soft-input adjustment value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoftInputMode(u32);

impl SoftInputMode {
    pub const ADJUST_UNSPECIFIED: Self = Self(0x00);
    pub const ADJUST_RESIZE: Self = Self(0x10);
    pub const ADJUST_PAN: Self = Self(0x20);
    pub const ADJUST_NOTHING: Self = Self(0x30);

    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::ADJUST_RESIZE => Some("adjustResize"),
            Self::ADJUST_PAN => Some("adjustPan"),
            Self::ADJUST_NOTHING => Some("adjustNothing"),
            _ => None,
        }
    }
}

impl fmt::Display for SoftInputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02x}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown soft input mode `{0}`")]
pub struct UnknownSoftInputMode(pub String);

impl FromStr for SoftInputMode {
    type Err = UnknownSoftInputMode;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "adjustResize" => Ok(Self::ADJUST_RESIZE),
            "adjustPan" => Ok(Self::ADJUST_PAN),
            "adjustNothing" => Ok(Self::ADJUST_NOTHING),
            other => Err(UnknownSoftInputMode(other.to_owned())),
        }
    }
}

/// The window whose keyboard behaviour is adjusted.
pub trait SoftInputWindow: Send + Sync {
    fn soft_input_mode(&self) -> SoftInputMode;

    fn set_soft_input_mode(&self, mode: SoftInputMode);
}

/// Remembers the window's mode from before the first change so it can be put back.
#[derive(Debug, Default)]
pub struct SoftInputController {
    saved: Option<SoftInputMode>,
}

impl SoftInputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_mode(&self) -> Option<SoftInputMode> {
        self.saved
    }

    /// Applies `mode`. Returns false when nothing was changed.
    pub fn set_mode(&mut self, window: Option<&dyn SoftInputWindow>, mode: SoftInputMode) -> bool {
        let Some(window) = window else {
            return false;
        };
        if self.saved == Some(mode) {
            return false;
        }

        if self.saved.is_none() {
            self.saved = Some(window.soft_input_mode());
        }
        log::debug!("soft input mode set to {mode}");
        window.set_soft_input_mode(mode);
        true
    }

    /// Puts back the mode saved by the first `set_mode`. Returns false when nothing was saved.
    pub fn restore(&mut self, window: Option<&dyn SoftInputWindow>) -> bool {
        let Some(window) = window else {
            return false;
        };
        let Some(saved) = self.saved.take() else {
            return false;
        };

        log::debug!("soft input mode restored to {saved}");
        window.set_soft_input_mode(saved);
        true
    }
}
