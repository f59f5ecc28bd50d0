//! The embedded web content host: engine hooks, handoff execution and host commands.

use crate::config::HostConfig;
use crate::services::HostServices;
use crate::soft_input::SoftInputController;
use crate::soft_input::SoftInputMode;
use crate::soft_input::SoftInputWindow;
use pt_core::HostResult;
use pt_core::Notice;
use pt_core::Notifier;
use pt_download::DownloadError;
use pt_download::DownloadIntake;
use pt_download::DownloadJob;
use pt_download::DownloadRequest;
use pt_policy::HostAllowList;
use pt_policy::NavigationDecision;
use pt_policy::NavigationPolicy;
use pt_surface::AccentColor;
use pt_surface::ApplicationId;
use pt_surface::CachedSurfaceResolver;
use pt_surface::ColorParseError;
use pt_surface::ExternalLauncher;
use pt_surface::ExternalSurfaceResolver;
use pt_surface::LaunchError;
use pt_surface::OpenIntent;
use pt_surface::SurfaceConfig;
use pt_surface::TrustedSurfaceRequest;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;

/// What happened to a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The engine renders it.
    InPlace,
    /// Opened in an application's trusted surface.
    TrustedSurface { application: ApplicationId },
    /// Handed to whichever application the platform picks.
    PlatformHandoff,
    /// Nothing could open it; the user was told.
    HandoffFailed { error: LaunchError },
    /// The URL could not be classified and was dropped.
    Blocked { reason: String },
}

impl NavigationOutcome {
    /// Whether the engine must not load the URL itself.
    pub fn intercepts(&self) -> bool {
        !matches!(self, Self::InPlace)
    }
}

#[derive(Default)]
struct SoftInputState {
    window: Option<Arc<dyn SoftInputWindow>>,
    controller: SoftInputController,
}

pub struct WebContentHost {
    policy: NavigationPolicy,
    resolver: CachedSurfaceResolver,
    surface: RwLock<SurfaceConfig>,
    launcher: Arc<dyn ExternalLauncher>,
    downloads: RwLock<DownloadIntake>,
    notifier: Arc<dyn Notifier>,
    soft_input: Mutex<SoftInputState>,
}

impl WebContentHost {
    pub fn new(services: HostServices) -> Self {
        let HostServices {
            registry,
            launcher,
            directories,
            transfers,
            cookies,
            notifier,
        } = services;

        Self {
            policy: NavigationPolicy::default(),
            resolver: CachedSurfaceResolver::new(ExternalSurfaceResolver::new(registry)),
            surface: RwLock::new(SurfaceConfig::default()),
            launcher,
            downloads: RwLock::new(DownloadIntake::new(
                directories,
                cookies,
                transfers,
                Arc::clone(&notifier),
            )),
            notifier,
            soft_input: Mutex::new(SoftInputState::default()),
        }
    }

    pub fn with_config(services: HostServices, config: &HostConfig) -> HostResult<Self> {
        let host = Self::new(services);
        host.apply_config(config)?;
        Ok(host)
    }

    /// Applies every setting from `config`. An invalid colour is reported after the rest applied.
    pub fn apply_config(&self, config: &HostConfig) -> HostResult<()> {
        self.set_open_internally(config.open_internally.iter().cloned());
        self.set_download_prefix(&config.download.file_prefix);
        self.set_toolbar_color(config.toolbar_color.as_deref())?;
        Ok(())
    }

    /// Replaces the in-place allow-list wholesale.
    pub fn set_open_internally<I, S>(&self, hosts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.policy.replace_allow_list(HostAllowList::new(hosts));
    }

    pub fn allow_list(&self) -> Arc<HostAllowList> {
        self.policy.allow_list()
    }

    /// Sets or clears the trusted surface toolbar hint. An invalid colour keeps the current one.
    pub fn set_toolbar_color(&self, color: Option<&str>) -> Result<(), ColorParseError> {
        let accent_color = color.map(str::parse::<AccentColor>).transpose().map_err(|error| {
            log::warn!("ignoring toolbar color: {error}");
            error
        })?;

        let mut guard = match self.surface.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.accent_color = accent_color;
        Ok(())
    }

    pub fn toolbar_color(&self) -> Option<AccentColor> {
        self.surface_config().accent_color
    }

    pub fn set_download_prefix(&self, prefix: &str) {
        let mut guard = match self.downloads.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = guard.clone().with_file_prefix(prefix);
    }

    /// Drops the cached trusted-surface application, e.g. after packages changed.
    pub fn invalidate_handlers(&self) {
        self.resolver.invalidate();
    }

    /// Engine hook. Returns true when the engine must not load `url`.
    pub fn on_before_navigate(&self, url: &str) -> bool {
        self.intercept(url).intercepts()
    }

    /// Classifies `url` and performs any handoff it calls for.
    pub fn intercept(&self, url: &str) -> NavigationOutcome {
        let decision = match self.policy.classify(url) {
            Ok(decision) => decision,
            Err(error) => {
                log::warn!("blocking navigation: {error}");
                return NavigationOutcome::Blocked {
                    reason: error.reason,
                };
            }
        };

        match decision {
            NavigationDecision::InPlace => NavigationOutcome::InPlace,
            NavigationDecision::ExternalTrusted => self.open_trusted(url),
            NavigationDecision::ExternalHandoff => self.open_with_platform(url),
        }
    }

    fn open_trusted(&self, url: &str) -> NavigationOutcome {
        let Some(application) = self.resolver.resolve() else {
            log::debug!("no trusted surface application, handing `{url}` to the platform");
            return self.open_with_platform(url);
        };

        let request = TrustedSurfaceRequest::new(url, application, &self.surface_config());
        match self.launcher.open_trusted_surface(&request) {
            Ok(()) => NavigationOutcome::TrustedSurface {
                application: request.application,
            },
            Err(error) => {
                log::warn!(
                    "trusted surface launch in {} failed, falling back: {error}",
                    request.application
                );
                self.open_with_platform(url)
            }
        }
    }

    fn open_with_platform(&self, url: &str) -> NavigationOutcome {
        match self.launcher.open_with_platform(&OpenIntent::view(url)) {
            Ok(()) => NavigationOutcome::PlatformHandoff,
            Err(error) => {
                log::warn!("handoff of `{url}` failed: {error}");
                self.notifier.notify(&Notice::HandoffFailed {
                    url: url.to_owned(),
                });
                NavigationOutcome::HandoffFailed { error }
            }
        }
    }

    /// Engine hook for file downloads.
    pub fn on_download_requested(
        &self,
        url: &str,
        user_agent: &str,
        content_disposition: &str,
        mime_type: &str,
    ) -> Result<DownloadJob, DownloadError> {
        let intake = match self.downloads.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        intake.enqueue(&DownloadRequest {
            url: url.to_owned(),
            user_agent: user_agent.to_owned(),
            content_disposition: content_disposition.to_owned(),
            mime_type: mime_type.to_owned(),
        })
    }

    pub fn attach_window(&self, window: Arc<dyn SoftInputWindow>) {
        self.soft_input_state().window = Some(window);
    }

    pub fn detach_window(&self) {
        self.soft_input_state().window = None;
    }

    /// Host command taking a platform mode name; unknown names are ignored.
    pub fn set_soft_input_mode(&self, name: &str) -> bool {
        let mode = match name.parse::<SoftInputMode>() {
            Ok(mode) => mode,
            Err(error) => {
                log::warn!("{error}");
                return false;
            }
        };

        let mut state = self.soft_input_state();
        let SoftInputState { window, controller } = &mut *state;
        controller.set_mode(window.as_deref(), mode)
    }

    pub fn restore_soft_input_mode(&self) -> bool {
        let mut state = self.soft_input_state();
        let SoftInputState { window, controller } = &mut *state;
        controller.restore(window.as_deref())
    }

    fn surface_config(&self) -> SurfaceConfig {
        match self.surface.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn soft_input_state(&self) -> MutexGuard<'_, SoftInputState> {
        match self.soft_input.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
