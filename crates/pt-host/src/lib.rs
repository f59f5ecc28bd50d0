//! Composition root for hosting untrusted web content inside a native shell.
//!
//! [`WebContentHost`] receives the engine's navigation and download events, applies the
//! navigation policy, hands URLs to external applications and executes the host-side commands
//! (soft input mode, runtime settings).

pub mod config;
pub mod host;
pub mod services;
pub mod soft_input;

pub use config::DownloadConfig;
pub use config::HostConfig;
pub use host::NavigationOutcome;
pub use host::WebContentHost;
pub use services::HostServices;
pub use soft_input::SoftInputController;
pub use soft_input::SoftInputMode;
pub use soft_input::SoftInputWindow;
pub use soft_input::UnknownSoftInputMode;
