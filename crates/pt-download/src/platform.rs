//! Platform collaborators consumed by download intake.

use crate::intake::DownloadJob;
use std::path::PathBuf;
use thiserror::Error;

/// Storage locations for the downloads category.
pub trait DownloadDirectories: Send + Sync {
    /// Candidate directories, in platform preference order. They may not exist yet.
    fn candidate_dirs(&self) -> Vec<PathBuf>;

    /// Structured per-application downloads area, when the platform offers one.
    fn app_downloads_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// Why the transfer facility refused a job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("transfer facility unavailable: {0}")]
    Unavailable(String),
    #[error("transfer rejected: {reason}")]
    Rejected { reason: String },
}

/// Background transfer facility. Owns retries, progress and completion.
pub trait TransferQueue: Send + Sync {
    fn enqueue(&self, job: &DownloadJob) -> Result<(), TransferError>;
}

/// Explicitly configured directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedDownloadDirectories {
    pub candidates: Vec<PathBuf>,
    pub app_area: Option<PathBuf>,
}

impl FixedDownloadDirectories {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            app_area: None,
        }
    }

    pub fn with_app_area(mut self, app_area: PathBuf) -> Self {
        self.app_area = Some(app_area);
        self
    }
}

impl DownloadDirectories for FixedDownloadDirectories {
    fn candidate_dirs(&self) -> Vec<PathBuf> {
        self.candidates.clone()
    }

    fn app_downloads_dir(&self) -> Option<PathBuf> {
        self.app_area.clone()
    }
}

/// Desktop directories: the user's downloads folder plus a per-app area under local data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDownloadDirectories {
    app_name: String,
}

impl SystemDownloadDirectories {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl DownloadDirectories for SystemDownloadDirectories {
    fn candidate_dirs(&self) -> Vec<PathBuf> {
        dirs::download_dir().into_iter().collect()
    }

    fn app_downloads_dir(&self) -> Option<PathBuf> {
        dirs::data_local_dir().map(|root| root.join(&self.app_name).join("Downloads"))
    }
}
