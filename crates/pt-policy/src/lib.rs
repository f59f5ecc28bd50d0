//! Navigation policy: decides where every outbound URL is opened.

use pt_core::HostError;
use pt_net::CandidateUrl;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::RwLock;
use thiserror::Error;

/// Hosts that may be rendered in place.
///
/// An empty list is the unconfigured state and lets every host through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAllowList {
    hosts: BTreeSet<String>,
}

impl HostAllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Exact, case-sensitive host membership. Subdomains are not matched.
    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    /// Whether a URL with this host (or no host) may render in place.
    pub fn permits(&self, host: Option<&str>) -> bool {
        if self.is_empty() {
            return true;
        }

        host.is_some_and(|host| self.contains(host))
    }
}

/// Where a navigation should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Render inside the embedded engine.
    InPlace,
    /// Open in an external trusted browsing surface.
    ExternalTrusted,
    /// Hand the URL to whichever application the platform picks.
    ExternalHandoff,
}

impl NavigationDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InPlace => "in-place",
            Self::ExternalTrusted => "external-trusted",
            Self::ExternalHandoff => "external-handoff",
        }
    }

    /// Whether the engine must stop its own navigation.
    pub fn intercepts(self) -> bool {
        !matches!(self, Self::InPlace)
    }
}

/// A candidate URL could not be classified. Callers must not navigate in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot classify `{url}`: {reason}")]
pub struct ClassifyError {
    pub url: String,
    pub reason: String,
}

impl ClassifyError {
    pub fn code(&self) -> &'static str {
        "policy.classify_failed"
    }
}

impl From<ClassifyError> for HostError {
    fn from(error: ClassifyError) -> Self {
        HostError::new(error.code(), error.to_string())
    }
}

/// Classifies URLs against a replaceable allow-list snapshot.
#[derive(Debug, Default)]
pub struct NavigationPolicy {
    allow_list: RwLock<Arc<HostAllowList>>,
}

impl NavigationPolicy {
    pub fn new(allow_list: HostAllowList) -> Self {
        Self {
            allow_list: RwLock::new(Arc::new(allow_list)),
        }
    }

    /// Current allow-list. Later replacements do not affect the returned snapshot.
    pub fn allow_list(&self) -> Arc<HostAllowList> {
        let guard = match self.allow_list.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }

    /// Replaces the whole allow-list; entries are never merged.
    pub fn replace_allow_list(&self, allow_list: HostAllowList) {
        log::debug!("replacing allow-list with {} host(s)", allow_list.len());
        let mut guard = match self.allow_list.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(allow_list);
    }

    pub fn classify(&self, url: &str) -> Result<NavigationDecision, ClassifyError> {
        let candidate = CandidateUrl::parse(url).map_err(|error| ClassifyError {
            url: url.to_owned(),
            reason: error.message,
        })?;

        let decision = classify_with(&self.allow_list(), &candidate);
        log::debug!("classified `{url}` as {}", decision.as_str());
        Ok(decision)
    }
}

/// Pure classification over an explicit allow-list.
pub fn classify_with(allow_list: &HostAllowList, url: &CandidateUrl) -> NavigationDecision {
    if !url.is_web_scheme() && !url.is_blank_sentinel() {
        return NavigationDecision::ExternalHandoff;
    }

    if allow_list.permits(url.host_as_written()) {
        NavigationDecision::InPlace
    } else {
        NavigationDecision::ExternalTrusted
    }
}
