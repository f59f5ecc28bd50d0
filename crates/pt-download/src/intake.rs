//! Download intake: naming, stale-file cleanup, destination choice and transfer hand-off.

use crate::naming::DEFAULT_FILE_PREFIX;
use crate::naming::derive_file_name;
use crate::platform::DownloadDirectories;
use crate::platform::TransferError;
use crate::platform::TransferQueue;
use pt_core::HostError;
use pt_core::Notice;
use pt_core::Notifier;
use pt_net::CandidateUrl;
use pt_storage::CookieSource;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// File download reported by the embedded engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub user_agent: String,
    pub content_disposition: String,
    pub mime_type: String,
}

/// Where the destination directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationKind {
    /// The platform's structured per-application downloads area.
    AppArea,
    /// First existing candidate downloads directory.
    Directory,
}

/// Transfer handed to the platform's background facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub source_url: String,
    pub file_name: String,
    pub destination_dir: PathBuf,
    pub destination_kind: DestinationKind,
    pub mime_type: String,
    pub auth_cookie: Option<String>,
    pub user_agent: String,
    pub title: String,
    pub notify_on_completion: bool,
    pub media_scannable: bool,
}

impl DownloadJob {
    pub fn destination(&self) -> PathBuf {
        self.destination_dir.join(&self.file_name)
    }

    /// Request headers for the transfer, `Cookie` first.
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(cookie) = self.auth_cookie.as_deref() {
            headers.push(("Cookie", cookie));
        }
        if !self.user_agent.is_empty() {
            headers.push(("User-Agent", self.user_agent.as_str()));
        }
        headers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("invalid download URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("no destination directory available for `{file_name}`")]
    NoDestination { file_name: String },
    #[error("transfer facility rejected `{file_name}`: {source}")]
    TransferRejected {
        file_name: String,
        #[source]
        source: TransferError,
    },
}

impl DownloadError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "download.invalid_url",
            Self::NoDestination { .. } => "download.no_destination",
            Self::TransferRejected { .. } => "download.transfer_rejected",
        }
    }
}

impl From<DownloadError> for HostError {
    fn from(error: DownloadError) -> Self {
        HostError::new(error.code(), error.to_string())
    }
}

/// Turns engine download events into background transfer jobs.
#[derive(Clone)]
pub struct DownloadIntake {
    file_prefix: String,
    directories: Arc<dyn DownloadDirectories>,
    cookies: Arc<dyn CookieSource>,
    transfers: Arc<dyn TransferQueue>,
    notifier: Arc<dyn Notifier>,
}

impl DownloadIntake {
    pub fn new(
        directories: Arc<dyn DownloadDirectories>,
        cookies: Arc<dyn CookieSource>,
        transfers: Arc<dyn TransferQueue>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
            directories,
            cookies,
            transfers,
            notifier,
        }
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Enqueues one transfer and tells the user whether it started.
    pub fn enqueue(&self, request: &DownloadRequest) -> Result<DownloadJob, DownloadError> {
        let result = self.submit(request);

        match &result {
            Ok(job) => {
                log::info!(
                    "download enqueued: {} -> {}",
                    job.source_url,
                    job.destination().display()
                );
                self.notifier.notify(&Notice::DownloadStarted {
                    file_name: job.file_name.clone(),
                });
            }
            Err(error) => {
                log::warn!("download failed: {error}");
                self.notifier.notify(&Notice::DownloadFailed {
                    reason: error.to_string(),
                });
            }
        }

        result
    }

    fn submit(&self, request: &DownloadRequest) -> Result<DownloadJob, DownloadError> {
        let url = CandidateUrl::parse(&request.url).map_err(|error| DownloadError::InvalidUrl {
            url: request.url.clone(),
            reason: error.message,
        })?;
        if !url.is_network_scheme() {
            return Err(DownloadError::InvalidUrl {
                url: request.url.clone(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            });
        }

        let file_name = derive_file_name(&self.file_prefix, &url, &request.mime_type);
        log::debug!(
            "download source {} as {file_name} (disposition: {:?})",
            url.as_str(),
            request.content_disposition
        );

        let app_area = self.directories.app_downloads_dir();
        let candidates = self.directories.candidate_dirs();
        let mut prepared: Vec<&Path> = Vec::with_capacity(candidates.len() + 1);
        for dir in app_area.iter().chain(candidates.iter()) {
            if !prepared.contains(&dir.as_path()) {
                clear_stale_download(dir, &file_name);
                prepared.push(dir);
            }
        }

        let (destination_dir, destination_kind) =
            select_destination(app_area.as_deref(), &candidates).ok_or_else(|| {
                DownloadError::NoDestination {
                    file_name: file_name.clone(),
                }
            })?;

        let job = DownloadJob {
            source_url: request.url.clone(),
            file_name: file_name.clone(),
            destination_dir,
            destination_kind,
            mime_type: request.mime_type.clone(),
            auth_cookie: self.cookies.cookie_header(&request.url),
            user_agent: request.user_agent.clone(),
            title: file_name.clone(),
            notify_on_completion: true,
            media_scannable: true,
        };

        self.transfers
            .enqueue(&job)
            .map_err(|source| DownloadError::TransferRejected { file_name, source })?;

        Ok(job)
    }
}

/// Deletes an earlier download with the same name, or creates the missing directory.
fn clear_stale_download(dir: &Path, file_name: &str) {
    if !dir.exists() {
        match fs::create_dir_all(dir) {
            Ok(()) => log::debug!("created download directory {}", dir.display()),
            Err(error) => log::warn!(
                "failed to create download directory `{}`: {error}",
                dir.display()
            ),
        }
        return;
    }

    let stale = dir.join(file_name);
    if !stale.exists() {
        return;
    }

    match fs::remove_file(&stale) {
        Ok(()) => log::debug!("deleted stale download {}", stale.display()),
        Err(error) => log::warn!(
            "failed to delete stale download `{}`: {error}",
            stale.display()
        ),
    }
}

fn select_destination(
    app_area: Option<&Path>,
    candidates: &[PathBuf],
) -> Option<(PathBuf, DestinationKind)> {
    if let Some(area) = app_area.filter(|area| area.is_dir()) {
        return Some((area.to_path_buf(), DestinationKind::AppArea));
    }

    candidates
        .iter()
        .find(|dir| dir.is_dir())
        .map(|dir| (dir.clone(), DestinationKind::Directory))
}

#[cfg(test)]
mod tests {
    use super::DestinationKind;
    use super::DownloadError;
    use super::DownloadIntake;
    use super::DownloadJob;
    use super::DownloadRequest;
    use crate::platform::FixedDownloadDirectories;
    use crate::platform::TransferError;
    use crate::platform::TransferQueue;
    use pt_core::Notice;
    use pt_core::Notifier;
    use pt_storage::CookieSource;
    use pt_storage::NoopCookieSource;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::Mutex;

    /// Completes every transfer immediately with a placeholder body.
    #[derive(Default)]
    struct WritingQueue {
        jobs: Mutex<Vec<DownloadJob>>,
    }

    impl TransferQueue for WritingQueue {
        fn enqueue(&self, job: &DownloadJob) -> Result<(), TransferError> {
            fs::write(job.destination(), job.source_url.as_bytes()).map_err(|error| {
                TransferError::Rejected {
                    reason: error.to_string(),
                }
            })?;
            if let Ok(mut jobs) = self.jobs.lock() {
                jobs.push(job.clone());
            }
            Ok(())
        }
    }

    struct RejectingQueue;

    impl TransferQueue for RejectingQueue {
        fn enqueue(&self, _job: &DownloadJob) -> Result<(), TransferError> {
            Err(TransferError::Unavailable(
                "download service disabled".to_owned(),
            ))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        fn notices(&self) -> Vec<Notice> {
            self.notices
                .lock()
                .map(|notices| notices.clone())
                .unwrap_or_default()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: &Notice) {
            if let Ok(mut notices) = self.notices.lock() {
                notices.push(notice.clone());
            }
        }
    }

    struct FixedCookie;

    impl CookieSource for FixedCookie {
        fn cookie_header(&self, _url: &str) -> Option<String> {
            Some("session=abc".to_owned())
        }
    }

    fn temp_root() -> tempfile::TempDir {
        match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(error) => panic!("{error}"),
        }
    }

    fn request(url: &str) -> DownloadRequest {
        DownloadRequest {
            url: url.to_owned(),
            user_agent: "PorticoTest/1.0".to_owned(),
            content_disposition: "attachment".to_owned(),
            mime_type: "application/pdf".to_owned(),
        }
    }

    fn files_in(dir: &PathBuf) -> Vec<String> {
        let mut names = fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    #[test]
    fn repeated_download_leaves_one_file() {
        let root = temp_root();
        let downloads = root.path().join("Download");
        let queue = Arc::new(WritingQueue::default());
        let intake = DownloadIntake::new(
            Arc::new(FixedDownloadDirectories::new(vec![downloads.clone()])),
            Arc::new(NoopCookieSource),
            queue.clone(),
            Arc::new(RecordingNotifier::default()),
        );

        for _ in 0..2 {
            let job = intake.enqueue(&request("https://my.ovoenergy.com/bills/1234"));
            assert!(job.is_ok());
        }

        assert_eq!(files_in(&downloads), vec!["OVO_1234.pdf".to_owned()]);
        assert_eq!(queue.jobs.lock().map(|jobs| jobs.len()).unwrap_or_default(), 2);
    }

    #[test]
    fn stale_files_are_removed_from_every_candidate() {
        let root = temp_root();
        let primary = root.path().join("primary");
        let secondary = root.path().join("secondary");
        for dir in [&primary, &secondary] {
            assert!(fs::create_dir_all(dir).is_ok());
            assert!(fs::write(dir.join("OVO_1234.pdf"), b"old").is_ok());
        }

        let intake = DownloadIntake::new(
            Arc::new(FixedDownloadDirectories::new(vec![
                primary.clone(),
                secondary.clone(),
            ])),
            Arc::new(NoopCookieSource),
            Arc::new(RejectingQueue),
            Arc::new(RecordingNotifier::default()),
        );

        let result = intake.enqueue(&request("https://example.com/bills/1234"));
        assert!(matches!(
            result,
            Err(DownloadError::TransferRejected {
                source: TransferError::Unavailable(_),
                ..
            })
        ));
        assert!(files_in(&primary).is_empty());
        assert!(files_in(&secondary).is_empty());
    }

    #[test]
    fn prefers_app_area_and_creates_missing_dirs() {
        let root = temp_root();
        let app_area = root.path().join("app").join("Download");
        let shared = root.path().join("shared");
        let intake = DownloadIntake::new(
            Arc::new(
                FixedDownloadDirectories::new(vec![shared.clone()]).with_app_area(app_area.clone()),
            ),
            Arc::new(FixedCookie),
            Arc::new(WritingQueue::default()),
            Arc::new(RecordingNotifier::default()),
        );

        let job = match intake.enqueue(&request("https://example.com/statement")) {
            Ok(job) => job,
            Err(error) => panic!("{error}"),
        };

        assert_eq!(job.destination_dir, app_area);
        assert_eq!(job.destination_kind, DestinationKind::AppArea);
        assert!(shared.is_dir());
        assert_eq!(
            job.headers(),
            vec![("Cookie", "session=abc"), ("User-Agent", "PorticoTest/1.0")]
        );
        assert_eq!(job.title, "OVO_statement.pdf");
        assert!(job.notify_on_completion);
    }

    #[test]
    fn falls_back_to_first_existing_candidate() {
        let root = temp_root();
        let unusable = root.path().join("blocked");
        assert!(fs::write(&unusable, b"not a directory").is_ok());
        let usable = root.path().join("usable");

        let intake = DownloadIntake::new(
            Arc::new(FixedDownloadDirectories::new(vec![
                unusable.clone(),
                usable.clone(),
            ])),
            Arc::new(NoopCookieSource),
            Arc::new(WritingQueue::default()),
            Arc::new(RecordingNotifier::default()),
        );

        let job = intake.enqueue(&request("https://example.com/a/b"));
        assert_eq!(
            job.map(|job| (job.destination_dir, job.destination_kind)),
            Ok((usable, DestinationKind::Directory))
        );
    }

    #[test]
    fn no_directories_is_no_destination() {
        let notifier = Arc::new(RecordingNotifier::default());
        let intake = DownloadIntake::new(
            Arc::new(FixedDownloadDirectories::default()),
            Arc::new(NoopCookieSource),
            Arc::new(WritingQueue::default()),
            notifier.clone(),
        );

        let result = intake.enqueue(&request("https://example.com/a/b"));
        assert!(matches!(result, Err(DownloadError::NoDestination { .. })));
        assert!(matches!(
            notifier.notices().as_slice(),
            [Notice::DownloadFailed { .. }]
        ));
    }

    #[test]
    fn malformed_url_touches_nothing() {
        let root = temp_root();
        let downloads = root.path().join("never-created");
        let notifier = Arc::new(RecordingNotifier::default());
        let intake = DownloadIntake::new(
            Arc::new(FixedDownloadDirectories::new(vec![downloads.clone()])),
            Arc::new(NoopCookieSource),
            Arc::new(WritingQueue::default()),
            notifier.clone(),
        );

        for url in ["::not a url::", "blob:https://example.com/1234"] {
            let result = intake.enqueue(&request(url));
            assert!(matches!(result, Err(DownloadError::InvalidUrl { .. })));
        }
        assert!(!downloads.exists());
        assert_eq!(notifier.notices().len(), 2);
    }

    #[test]
    fn success_is_announced_with_file_name() {
        let root = temp_root();
        let notifier = Arc::new(RecordingNotifier::default());
        let intake = DownloadIntake::new(
            Arc::new(FixedDownloadDirectories::new(vec![root.path().to_path_buf()])),
            Arc::new(NoopCookieSource),
            Arc::new(WritingQueue::default()),
            notifier.clone(),
        )
        .with_file_prefix("ACME");

        assert!(intake.enqueue(&request("https://example.com/x/42")).is_ok());
        assert_eq!(
            notifier.notices(),
            vec![Notice::DownloadStarted {
                file_name: "ACME_42.pdf".to_owned()
            }]
        );
    }
}
