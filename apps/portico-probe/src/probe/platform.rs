//! Simulated platform described by the `[platform]` table of the probe config.

use pt_core::Notice;
use pt_core::Notifier;
use pt_download::DownloadDirectories;
use pt_download::DownloadJob;
use pt_download::FixedDownloadDirectories;
use pt_download::SystemDownloadDirectories;
use pt_download::TransferError;
use pt_download::TransferQueue;
use pt_host::HostServices;
use pt_storage::SessionCookieJar;
use pt_surface::ExternalLauncher;
use pt_surface::HandlerRegistry;
use pt_surface::LaunchError;
use pt_surface::OpenIntent;
use pt_surface::StaticHandlerRegistry;
use pt_surface::TrustedSurfaceRequest;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

const APP_NAME: &str = "portico";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    #[serde(flatten)]
    pub registry: StaticHandlerRegistry,
    /// Non-web schemes some installed application claims, e.g. `mailto`.
    pub schemes: Vec<String>,
    /// Shared downloads directories. Empty uses the desktop's own locations.
    pub download_dirs: Vec<PathBuf>,
    pub app_area: Option<PathBuf>,
    pub cookies: Vec<CookieSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CookieSeed {
    pub domain: String,
    pub name: String,
    pub value: String,
}

pub struct SimulatedPlatform {
    config: PlatformConfig,
}

impl SimulatedPlatform {
    pub fn new(config: PlatformConfig) -> Self {
        Self { config }
    }

    pub fn registry(&self) -> Arc<dyn HandlerRegistry> {
        Arc::new(self.config.registry.clone())
    }

    pub fn services(&self) -> HostServices {
        let cookies = SessionCookieJar::new();
        for seed in &self.config.cookies {
            if !cookies.set_cookie(&seed.domain, &seed.name, &seed.value) {
                log::warn!("skipping cookie `{}` for domain `{}`", seed.name, seed.domain);
            }
        }

        HostServices::new(
            self.registry(),
            Arc::new(SimulatedLauncher {
                has_browser: !self.config.registry.handlers.is_empty(),
                schemes: self.config.schemes.clone(),
            }),
            self.directories(),
            Arc::new(PlaceholderTransferQueue),
        )
        .with_cookies(Arc::new(cookies))
        .with_notifier(Arc::new(LoggingNotifier))
    }

    fn directories(&self) -> Arc<dyn DownloadDirectories> {
        if self.config.download_dirs.is_empty() && self.config.app_area.is_none() {
            return Arc::new(SystemDownloadDirectories::new(APP_NAME));
        }

        let fixed = FixedDownloadDirectories::new(self.config.download_dirs.clone());
        match &self.config.app_area {
            Some(area) => Arc::new(fixed.with_app_area(area.clone())),
            None => Arc::new(fixed),
        }
    }
}

/// Logs launches instead of starting anything.
struct SimulatedLauncher {
    has_browser: bool,
    schemes: Vec<String>,
}

impl SimulatedLauncher {
    fn can_open(&self, url: &str) -> bool {
        let Some((scheme, _)) = url.split_once(':') else {
            return false;
        };
        let scheme = scheme.to_ascii_lowercase();
        if matches!(scheme.as_str(), "http" | "https") {
            return self.has_browser;
        }
        self.schemes.iter().any(|known| known.eq_ignore_ascii_case(&scheme))
    }
}

impl ExternalLauncher for SimulatedLauncher {
    fn open_trusted_surface(&self, request: &TrustedSurfaceRequest) -> Result<(), LaunchError> {
        match request.toolbar_color {
            Some(color) => log::info!(
                "trusted surface {} <- {} (toolbar {color})",
                request.application,
                request.url
            ),
            None => log::info!("trusted surface {} <- {}", request.application, request.url),
        }
        Ok(())
    }

    fn open_with_platform(&self, intent: &OpenIntent) -> Result<(), LaunchError> {
        if !self.can_open(&intent.url) {
            return Err(LaunchError::HandlerNotFound {
                url: intent.url.clone(),
            });
        }
        log::info!("platform handoff <- {} (new task: {})", intent.url, intent.new_task);
        Ok(())
    }
}

/// Completes every job at once by creating an empty file at the destination.
struct PlaceholderTransferQueue;

impl TransferQueue for PlaceholderTransferQueue {
    fn enqueue(&self, job: &DownloadJob) -> Result<(), TransferError> {
        for (name, value) in job.headers() {
            log::debug!("transfer header {name}: {value}");
        }
        File::create(job.destination())
            .map(|_| ())
            .map_err(|error| TransferError::Rejected {
                reason: format!("{}: {error}", job.destination().display()),
            })
    }
}

struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_error() {
            log::warn!("notice: {} ({notice:?})", notice.text());
        } else {
            log::info!("notice: {} ({notice:?})", notice.text());
        }
    }
}
