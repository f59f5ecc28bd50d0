//! Platform registry of applications able to open web URLs.

use core::fmt;
use serde::Deserialize;
use thiserror::Error;

/// Platform package identifier of an installed application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(String);

impl ApplicationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One application registered for the generic "open http(s) URL" action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstalledHandler {
    #[serde(rename = "package")]
    pub application_id: ApplicationId,
    /// Advertises the trusted browsing surface ("custom tab") service.
    #[serde(default, rename = "trusted_surface")]
    pub supports_trusted_surface: bool,
    /// Registration filter restricts on a specific authority and path.
    #[serde(default, rename = "specialized")]
    pub is_specialized: bool,
}

impl InstalledHandler {
    pub fn browser(application_id: impl Into<String>) -> Self {
        Self {
            application_id: ApplicationId::new(application_id),
            supports_trusted_surface: true,
            is_specialized: false,
        }
    }

    pub fn plain(application_id: impl Into<String>) -> Self {
        Self {
            application_id: ApplicationId::new(application_id),
            supports_trusted_surface: false,
            is_specialized: false,
        }
    }

    pub fn specialized(mut self) -> Self {
        self.is_specialized = true;
        self
    }
}

/// A platform registry query failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("handler registry is unavailable: {0}")]
    Unavailable(String),
    #[error("handler registry query `{query}` failed: {reason}")]
    QueryFailed { query: &'static str, reason: String },
}

/// Read-only view of the platform's URL handler registrations.
pub trait HandlerRegistry: Send + Sync {
    /// Applications able to open a generic http(s) URL.
    fn candidate_handlers(&self) -> Result<Vec<InstalledHandler>, RegistryError>;

    /// The platform's current default for that action, if the user picked one.
    fn default_handler(&self) -> Result<Option<ApplicationId>, RegistryError>;

    /// Registrations whose filter is scoped to an authority and path.
    fn specialized_handlers(&self) -> Result<Vec<InstalledHandler>, RegistryError> {
        Ok(self
            .candidate_handlers()?
            .into_iter()
            .filter(|handler| handler.is_specialized)
            .collect())
    }
}

/// Fixed registry contents, used by tests and simulated platforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StaticHandlerRegistry {
    #[serde(default)]
    pub handlers: Vec<InstalledHandler>,
    #[serde(default)]
    pub default_handler: Option<ApplicationId>,
}

impl StaticHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handler(mut self, handler: InstalledHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_default(mut self, application_id: impl Into<String>) -> Self {
        self.default_handler = Some(ApplicationId::new(application_id));
        self
    }
}

impl HandlerRegistry for StaticHandlerRegistry {
    fn candidate_handlers(&self) -> Result<Vec<InstalledHandler>, RegistryError> {
        Ok(self.handlers.clone())
    }

    fn default_handler(&self) -> Result<Option<ApplicationId>, RegistryError> {
        Ok(self.default_handler.clone())
    }
}

/// Registry for hosts without any handler discovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandlerRegistry;

impl HandlerRegistry for NoopHandlerRegistry {
    fn candidate_handlers(&self) -> Result<Vec<InstalledHandler>, RegistryError> {
        Ok(Vec::new())
    }

    fn default_handler(&self) -> Result<Option<ApplicationId>, RegistryError> {
        Ok(None)
    }
}
