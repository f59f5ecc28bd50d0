//! Handoff requests passed to the platform launcher.

use crate::color::AccentColor;
use crate::registry::ApplicationId;
use pt_core::HostError;
use thiserror::Error;

/// Per-host configuration of the trusted surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub accent_color: Option<AccentColor>,
}

/// Open a URL in a specific application's trusted browsing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedSurfaceRequest {
    pub url: String,
    pub application: ApplicationId,
    /// Display hint, omitted when no accent colour is configured.
    pub toolbar_color: Option<AccentColor>,
}

impl TrustedSurfaceRequest {
    pub fn new(url: impl Into<String>, application: ApplicationId, config: &SurfaceConfig) -> Self {
        Self {
            url: url.into(),
            application,
            toolbar_color: config.accent_color,
        }
    }
}

/// Generic "view this URL" request resolved by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenIntent {
    pub url: String,
    /// Start the target in its own task instead of on top of the host.
    pub new_task: bool,
}

impl OpenIntent {
    pub fn view(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            new_task: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("no application can handle `{url}`")]
    HandlerNotFound { url: String },
    #[error("platform rejected launch: {reason}")]
    Rejected { reason: String },
}

impl LaunchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::HandlerNotFound { .. } => "surface.handler_not_found",
            Self::Rejected { .. } => "surface.launch_rejected",
        }
    }
}

impl From<LaunchError> for HostError {
    fn from(error: LaunchError) -> Self {
        HostError::new(error.code(), error.to_string())
    }
}

/// Platform facility that starts other applications.
pub trait ExternalLauncher: Send + Sync {
    fn open_trusted_surface(&self, request: &TrustedSurfaceRequest) -> Result<(), LaunchError>;

    fn open_with_platform(&self, intent: &OpenIntent) -> Result<(), LaunchError>;
}
