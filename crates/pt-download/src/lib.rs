//! File download intake for the embedded web content host.

pub mod intake;
pub mod naming;
pub mod platform;

pub use intake::DestinationKind;
pub use intake::DownloadError;
pub use intake::DownloadIntake;
pub use intake::DownloadJob;
pub use intake::DownloadRequest;
pub use naming::DEFAULT_FILE_PREFIX;
pub use naming::derive_file_name;
pub use naming::extension_for_mime;
pub use platform::DownloadDirectories;
pub use platform::FixedDownloadDirectories;
pub use platform::SystemDownloadDirectories;
pub use platform::TransferError;
pub use platform::TransferQueue;
