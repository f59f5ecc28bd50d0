//! Selection of the application that hosts trusted browsing surfaces.

use crate::registry::ApplicationId;
use crate::registry::HandlerRegistry;
use crate::registry::InstalledHandler;
use std::sync::Arc;
use std::sync::Mutex;

/// Stable release channel of the reference trusted-surface browser.
pub const STABLE_CHANNEL_ID: &str = "com.android.chrome";
/// Locally built / preview channel of the same browser.
pub const LOCAL_CHANNEL_ID: &str = "com.google.android.apps.chrome";

/// Registry state captured for one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSnapshot {
    pub candidates: Vec<InstalledHandler>,
    pub default_handler: Option<ApplicationId>,
    pub has_specialized_handlers: bool,
}

impl HandlerSnapshot {
    /// Queries the registry. Failures degrade to the most permissive empty answer and are logged.
    pub fn capture(registry: &dyn HandlerRegistry) -> Self {
        let candidates = registry.candidate_handlers().unwrap_or_else(|error| {
            log::warn!("listing URL handlers failed, assuming none: {error}");
            Vec::new()
        });

        let default_handler = registry.default_handler().unwrap_or_else(|error| {
            log::warn!("querying default URL handler failed: {error}");
            None
        });

        let has_specialized_handlers = match registry.specialized_handlers() {
            Ok(handlers) => !handlers.is_empty(),
            Err(error) => {
                log::warn!("querying specialized URL handlers failed, treating as none: {error}");
                false
            }
        };

        Self {
            candidates,
            default_handler,
            has_specialized_handlers,
        }
    }

    /// Applications advertising the trusted-surface service, first registration order, no repeats.
    pub fn trusted_surface_capable(&self) -> Vec<&ApplicationId> {
        let mut capable: Vec<&ApplicationId> = Vec::new();
        for handler in &self.candidates {
            if handler.supports_trusted_surface && !capable.contains(&&handler.application_id) {
                capable.push(&handler.application_id);
            }
        }
        capable
    }
}

/// Outcome of the tie-break, naming the rule that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// No installed application offers a trusted surface.
    Unavailable,
    /// Exactly one application offers it.
    Only(ApplicationId),
    PlatformDefault(ApplicationId),
    StableChannel(ApplicationId),
    LocalChannel(ApplicationId),
    /// Several candidates and no rule picked one; the platform chooser decides instead.
    Ambiguous,
}

impl Selection {
    pub fn application(&self) -> Option<&ApplicationId> {
        match self {
            Self::Only(id)
            | Self::PlatformDefault(id)
            | Self::StableChannel(id)
            | Self::LocalChannel(id) => Some(id),
            Self::Unavailable | Self::Ambiguous => None,
        }
    }

    pub fn into_application(self) -> Option<ApplicationId> {
        match self {
            Self::Only(id)
            | Self::PlatformDefault(id)
            | Self::StableChannel(id)
            | Self::LocalChannel(id) => Some(id),
            Self::Unavailable | Self::Ambiguous => None,
        }
    }

    pub fn rule(&self) -> &'static str {
        match self {
            Self::Unavailable => "unavailable",
            Self::Only(_) => "only-candidate",
            Self::PlatformDefault(_) => "platform-default",
            Self::StableChannel(_) => "stable-channel",
            Self::LocalChannel(_) => "local-channel",
            Self::Ambiguous => "ambiguous",
        }
    }
}

/// Deterministic tie-break over a captured snapshot.
pub fn select_trusted_surface(snapshot: &HandlerSnapshot) -> Selection {
    let capable = snapshot.trusted_surface_capable();

    match capable.as_slice() {
        [] => return Selection::Unavailable,
        [only] => return Selection::Only((*only).clone()),
        _ => {}
    }

    if let Some(default) = &snapshot.default_handler {
        if !default.is_empty() && !snapshot.has_specialized_handlers && capable.contains(&default) {
            return Selection::PlatformDefault(default.clone());
        }
    }

    if let Some(id) = find_capable(&capable, STABLE_CHANNEL_ID) {
        return Selection::StableChannel(id);
    }

    if let Some(id) = find_capable(&capable, LOCAL_CHANNEL_ID) {
        return Selection::LocalChannel(id);
    }

    Selection::Ambiguous
}

fn find_capable(capable: &[&ApplicationId], wanted: &str) -> Option<ApplicationId> {
    capable
        .iter()
        .find(|id| id.as_str() == wanted)
        .map(|id| (*id).clone())
}

/// Picks the trusted-surface application by querying the platform registry.
#[derive(Clone)]
pub struct ExternalSurfaceResolver {
    registry: Arc<dyn HandlerRegistry>,
}

impl ExternalSurfaceResolver {
    pub fn new(registry: Arc<dyn HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn select(&self) -> Selection {
        let snapshot = HandlerSnapshot::capture(self.registry.as_ref());
        let selection = select_trusted_surface(&snapshot);
        log::debug!(
            "trusted surface selection: {} ({:?}) from {} candidate(s)",
            selection.rule(),
            selection.application().map(ApplicationId::as_str),
            snapshot.candidates.len()
        );
        selection
    }

    pub fn resolve(&self) -> Option<ApplicationId> {
        self.select().into_application()
    }
}

/// Resolves once and reuses the answer until invalidated.
pub struct CachedSurfaceResolver {
    resolver: ExternalSurfaceResolver,
    cached: Mutex<Option<Option<ApplicationId>>>,
}

impl CachedSurfaceResolver {
    pub fn new(resolver: ExternalSurfaceResolver) -> Self {
        Self {
            resolver,
            cached: Mutex::new(None),
        }
    }

    pub fn resolve(&self) -> Option<ApplicationId> {
        let mut guard = match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(cached) = guard.as_ref() {
            return cached.clone();
        }

        let resolved = self.resolver.resolve();
        *guard = Some(resolved.clone());
        resolved
    }

    /// Forgets the cached answer, e.g. after packages were installed or removed.
    pub fn invalidate(&self) {
        let mut guard = match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}
