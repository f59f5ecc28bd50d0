//! Platform capabilities injected into the host.

use pt_core::NoopNotifier;
use pt_core::Notifier;
use pt_download::DownloadDirectories;
use pt_download::TransferQueue;
use pt_storage::CookieSource;
use pt_storage::NoopCookieSource;
use pt_surface::ExternalLauncher;
use pt_surface::HandlerRegistry;
use std::sync::Arc;

/// Everything the host asks of the platform. Cookies and notices default to no-ops.
#[derive(Clone)]
pub struct HostServices {
    pub registry: Arc<dyn HandlerRegistry>,
    pub launcher: Arc<dyn ExternalLauncher>,
    pub directories: Arc<dyn DownloadDirectories>,
    pub transfers: Arc<dyn TransferQueue>,
    pub cookies: Arc<dyn CookieSource>,
    pub notifier: Arc<dyn Notifier>,
}

impl HostServices {
    pub fn new(
        registry: Arc<dyn HandlerRegistry>,
        launcher: Arc<dyn ExternalLauncher>,
        directories: Arc<dyn DownloadDirectories>,
        transfers: Arc<dyn TransferQueue>,
    ) -> Self {
        Self {
            registry,
            launcher,
            directories,
            transfers,
            cookies: Arc::new(NoopCookieSource),
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
