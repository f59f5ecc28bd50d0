//! URL parsing for navigation and download candidates.

use pt_core::HostError;
use pt_core::HostResult;
use percent_encoding::percent_decode_str;
use url::Url;

/// Sentinel used by engines to reset a view.
pub const BLANK_URL: &str = "about:blank";

/// Schemes rendered by the embedded engine itself.
const WEB_SCHEMES: &[&str] = &["http", "https", "file"];

/// Schemes the platform transfer facility can fetch.
const NETWORK_SCHEMES: &[&str] = &["http", "https"];

/// Outbound URL parsed on demand into scheme, host and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    raw: String,
    parsed: Url,
}

impl CandidateUrl {
    pub fn parse(input: &str) -> HostResult<Self> {
        let parsed = Url::parse(input).map_err(|error| {
            HostError::new(
                "net.url.invalid",
                format!("failed to parse URL `{input}`: {error}"),
            )
        })?;

        Ok(Self {
            raw: input.to_owned(),
            parsed,
        })
    }

    /// The URL exactly as the engine reported it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        self.parsed.scheme()
    }

    /// Host as normalised by the URL parser; `None` for hostless URLs such as `mailto:`.
    pub fn host(&self) -> Option<&str> {
        self.parsed.host_str().filter(|host| !host.is_empty())
    }

    /// Host exactly as it appears in the authority, case preserved. Port and userinfo are
    /// stripped and IPv6 literals keep their brackets.
    pub fn host_as_written(&self) -> Option<&str> {
        self.host()?;
        let (_, rest) = self.raw.split_once("://")?;
        let authority = match rest.find(['/', '?', '#', '\\']) {
            Some(end) => &rest[..end],
            None => rest,
        };
        let host_port = match authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => authority,
        };
        let host = if host_port.starts_with('[') {
            match host_port.find(']') {
                Some(end) => &host_port[..=end],
                None => host_port,
            }
        } else {
            match host_port.split_once(':') {
                Some((host, _)) => host,
                None => host_port,
            }
        };
        Some(host).filter(|host| !host.is_empty())
    }

    pub fn path(&self) -> &str {
        self.parsed.path()
    }

    pub fn is_blank_sentinel(&self) -> bool {
        self.raw == BLANK_URL
    }

    /// True for `http`, `https` and `file` URLs.
    pub fn is_web_scheme(&self) -> bool {
        WEB_SCHEMES.contains(&self.scheme())
    }

    pub fn is_network_scheme(&self) -> bool {
        NETWORK_SCHEMES.contains(&self.scheme())
    }

    /// Last non-empty path segment, percent-decoded.
    pub fn last_path_segment(&self) -> Option<String> {
        let segments = self.parsed.path_segments()?;
        let last = segments.filter(|segment| !segment.is_empty()).last()?;
        Some(percent_decode_str(last).decode_utf8_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::CandidateUrl;

    fn parse(input: &str) -> CandidateUrl {
        match CandidateUrl::parse(input) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn splits_https_url() {
        let url = parse("https://help.duckduckgo.com/asdgasdg/");
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host(), Some("help.duckduckgo.com"));
        assert_eq!(url.path(), "/asdgasdg/");
        assert!(url.is_web_scheme());
        assert!(url.is_network_scheme());
    }

    #[test]
    fn host_as_written_keeps_case() {
        let url = parse("https://DuckDuckGo.com/search?q=1");
        assert_eq!(url.host(), Some("duckduckgo.com"));
        assert_eq!(url.host_as_written(), Some("DuckDuckGo.com"));
    }

    #[test]
    fn host_as_written_strips_userinfo_and_port() {
        assert_eq!(
            parse("https://user:pw@My.Example.com:8443/a").host_as_written(),
            Some("My.Example.com")
        );
        assert_eq!(parse("http://[::1]:8080/").host_as_written(), Some("[::1]"));
        assert_eq!(parse("https://example.com?x=@y").host_as_written(), Some("example.com"));
        assert_eq!(parse("mailto:a@b.com").host_as_written(), None);
        assert_eq!(parse("file:///sdcard/page.html").host_as_written(), None);
    }

    #[test]
    fn rejects_relative_text() {
        let parsed = CandidateUrl::parse("not a url");
        assert!(parsed.is_err());
        if let Err(error) = parsed {
            assert_eq!(error.code, "net.url.invalid");
        }
    }

    #[test]
    fn mailto_has_no_host() {
        let url = parse("mailto:a@b.com");
        assert_eq!(url.scheme(), "mailto");
        assert_eq!(url.host(), None);
        assert!(!url.is_web_scheme());
        assert_eq!(url.last_path_segment(), None);
    }

    #[test]
    fn recognises_blank_sentinel() {
        let url = parse("about:blank");
        assert!(url.is_blank_sentinel());
        assert!(!url.is_web_scheme());
    }

    #[test]
    fn file_urls_are_web_but_not_network() {
        let url = parse("file:///sdcard/page.html");
        assert!(url.is_web_scheme());
        assert!(!url.is_network_scheme());
        assert_eq!(url.host(), None);
    }

    #[test]
    fn last_segment_skips_trailing_slash_and_decodes() {
        assert_eq!(
            parse("https://example.com/files/").last_path_segment(),
            Some("files".to_owned())
        );
        assert_eq!(
            parse("https://example.com/docs/my%20bill.pdf?v=2").last_path_segment(),
            Some("my bill.pdf".to_owned())
        );
        assert_eq!(parse("https://example.com/").last_path_segment(), None);
    }

    #[test]
    fn malformed_escapes_are_kept_verbatim() {
        assert_eq!(
            parse("https://example.com/a%zzb%4").last_path_segment(),
            Some("a%zzb%4".to_owned())
        );
    }
}
