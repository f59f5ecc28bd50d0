//! Transient user-facing notices ("toasts").

/// Short message shown to the user without blocking the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DownloadStarted { file_name: String },
    DownloadFailed { reason: String },
    HandoffFailed { url: String },
}

impl Notice {
    /// Text shown to the user. Details stay in the logs.
    pub fn text(&self) -> &'static str {
        match self {
            Self::DownloadStarted { .. } => "Downloading file",
            Self::DownloadFailed { .. } => "Error downloading file",
            Self::HandoffFailed { .. } => "No application can open this link",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::DownloadStarted { .. })
    }
}

/// Host facility that displays transient notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) {}
}
