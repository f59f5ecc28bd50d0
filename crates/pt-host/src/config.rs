//! Host configuration loaded from TOML.

use pt_core::HostError;
use pt_core::HostResult;
use pt_download::DEFAULT_FILE_PREFIX;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Embedder-facing settings. Every field is optional in the file and unknown tables are ignored,
/// so embedders can keep their own sections next to these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Hosts rendered in place. Empty lets every web host through.
    pub open_internally: Vec<String>,
    /// Toolbar hint for the trusted surface: `#RRGGBB`, `#AARRGGBB` or a colour name.
    pub toolbar_color: Option<String>,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub file_prefix: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
        }
    }
}

impl HostConfig {
    pub fn load(path: &Path) -> HostResult<Self> {
        let body = fs::read_to_string(path).map_err(|error| {
            HostError::new(
                "config.read_failed",
                format!("failed to read {}: {error}", path.display()),
            )
        })?;
        Self::from_toml_str(&body).map_err(|error| {
            HostError::new(
                error.code,
                format!("{}: {}", path.display(), error.message),
            )
        })
    }

    pub fn from_toml_str(body: &str) -> HostResult<Self> {
        toml::from_str(body).map_err(|error| {
            HostError::new("config.parse_failed", format!("failed to parse: {error}"))
        })
    }
}
