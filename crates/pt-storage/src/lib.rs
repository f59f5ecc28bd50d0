//! Session storage: the cookie jar whose values authenticate background transfers.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use url::Url;

const MAX_COOKIE_DOMAINS: usize = 128;
const MAX_COOKIES_PER_DOMAIN: usize = 64;

/// Source of the `Cookie` header value to attach to a request for a URL.
pub trait CookieSource: Send + Sync {
    fn cookie_header(&self, url: &str) -> Option<String>;
}

/// Cookie source for hosts that keep no session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCookieSource;

impl CookieSource for NoopCookieSource {
    fn cookie_header(&self, _url: &str) -> Option<String> {
        None
    }
}

type DomainCookies = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory cookie store keyed by domain, seeded by the embedder.
#[derive(Debug, Default)]
pub struct SessionCookieJar {
    cookies: Mutex<DomainCookies>,
}

impl SessionCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `name=value` for `domain` and its subdomains. Returns false for an unusable domain.
    pub fn set_cookie(&self, domain: &str, name: &str, value: &str) -> bool {
        let Some(domain) = normalize_cookie_domain(domain) else {
            log::debug!("ignoring cookie `{name}` for unusable domain `{domain}`");
            return false;
        };
        if name.trim().is_empty() {
            return false;
        }

        let mut cookies = self.lock();
        make_room_for_domain(&mut cookies, &domain);
        let entries = cookies.entry(domain).or_default();
        if !entries.contains_key(name) && entries.len() >= MAX_COOKIES_PER_DOMAIN {
            entries.pop_first();
        }
        entries.insert(name.to_owned(), value.to_owned());
        true
    }

    pub fn domain_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, DomainCookies> {
        match self.cookies.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl CookieSource for SessionCookieJar {
    /// Cookies of every matching domain; the longest domain wins a name clash.
    fn cookie_header(&self, url: &str) -> Option<String> {
        let host = Url::parse(url)
            .ok()?
            .host_str()
            .filter(|host| !host.is_empty())
            .map(str::to_ascii_lowercase)?;
        let cookies = self.lock();

        let mut matching = cookies
            .iter()
            .filter(|(domain, _)| cookie_domain_matches(&host, domain))
            .collect::<Vec<_>>();
        matching.sort_by_key(|(domain, _)| std::cmp::Reverse(domain.len()));

        let mut selected = BTreeMap::<&str, &str>::new();
        for (name, value) in matching.into_iter().flat_map(|(_, entries)| entries) {
            selected.entry(name.as_str()).or_insert(value.as_str());
        }

        if selected.is_empty() {
            return None;
        }

        let pairs = selected
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>();
        Some(pairs.join("; "))
    }
}

fn make_room_for_domain(cookies: &mut DomainCookies, domain: &str) {
    if cookies.contains_key(domain) || cookies.len() < MAX_COOKIE_DOMAINS {
        return;
    }
    if let Some((evicted, _)) = cookies.pop_first() {
        log::debug!("cookie jar full, evicting domain {evicted}");
    }
}

/// Lower-cased domain without a leading dot; `None` when empty or containing whitespace.
fn normalize_cookie_domain(input: &str) -> Option<String> {
    let domain = input.trim().trim_start_matches('.');
    if domain.is_empty() || domain.contains(char::is_whitespace) {
        return None;
    }
    Some(domain.to_ascii_lowercase())
}

/// `host` equals `domain` or is a subdomain of it on a label boundary.
fn cookie_domain_matches(host: &str, domain: &str) -> bool {
    match host.strip_suffix(domain) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::CookieSource;
    use super::MAX_COOKIE_DOMAINS;
    use super::MAX_COOKIES_PER_DOMAIN;
    use super::SessionCookieJar;
    use super::cookie_domain_matches;

    #[test]
    fn header_includes_parent_domain_cookies() {
        let jar = SessionCookieJar::new();
        assert!(jar.set_cookie(".ovoenergy.com", "session", "abc"));
        assert!(jar.set_cookie("my.ovoenergy.com", "csrf", "xyz"));

        assert_eq!(
            jar.cookie_header("https://my.ovoenergy.com/bills/1.pdf"),
            Some("csrf=xyz; session=abc".to_owned())
        );
        assert_eq!(
            jar.cookie_header("https://ovoenergy.com/"),
            Some("session=abc".to_owned())
        );
        assert_eq!(jar.cookie_header("https://example.com/"), None);
        assert_eq!(jar.cookie_header("not a url"), None);
    }

    #[test]
    fn more_specific_domain_wins_name_clash() {
        let jar = SessionCookieJar::new();
        jar.set_cookie("example.com", "theme", "light");
        jar.set_cookie("app.example.com", "theme", "dark");
        assert_eq!(
            jar.cookie_header("https://APP.example.com/"),
            Some("theme=dark".to_owned())
        );
    }

    #[test]
    fn rejects_unusable_domains_and_names() {
        let jar = SessionCookieJar::new();
        assert!(!jar.set_cookie("", "a", "1"));
        assert!(!jar.set_cookie("...", "a", "1"));
        assert!(!jar.set_cookie("exa mple.com", "a", "1"));
        assert!(!jar.set_cookie("example.com", " ", "1"));
        assert_eq!(jar.domain_count(), 0);
    }

    #[test]
    fn per_domain_cookie_count_is_bounded() {
        let jar = SessionCookieJar::new();
        for index in 0..(MAX_COOKIES_PER_DOMAIN + 5) {
            jar.set_cookie("example.com", &format!("c{index:03}"), "v");
        }
        let header = jar.cookie_header("https://example.com/").unwrap_or_default();
        assert_eq!(header.split("; ").count(), MAX_COOKIES_PER_DOMAIN);
        assert!(header.contains("c068=v"));
    }

    #[test]
    fn domain_count_is_bounded() {
        let jar = SessionCookieJar::new();
        for index in 0..(MAX_COOKIE_DOMAINS + 3) {
            jar.set_cookie(&format!("site{index:04}.example"), "a", "1");
        }
        assert_eq!(jar.domain_count(), MAX_COOKIE_DOMAINS);
    }

    #[test]
    fn domain_matching_respects_label_boundary() {
        assert!(cookie_domain_matches("a.example.com", "example.com"));
        assert!(cookie_domain_matches("example.com", "example.com"));
        assert!(!cookie_domain_matches("badexample.com", "example.com"));
        assert!(!cookie_domain_matches("example.com", "a.example.com"));
    }
}
