use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

/// Cookie the backend stores its anti-forgery token in
pub const CSRF_COOKIE: &str = "csrftoken";
/// Header the token is echoed back in on state-changing requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Cookies held for the single backend origin, keyed by name.
///
/// Filled from the `Set-Cookie` headers of every response (parsed by
/// reqwest) and replayed as one `Cookie` header on every request.
/// `Path`, `Domain` and `Secure` are ignored: there is only one origin.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a jar from a persisted name/value map
    pub fn from_map(cookies: BTreeMap<String, String>) -> Self {
        CookieJar {
            cookies: RwLock::new(cookies),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.read().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.write().remove(name);
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the current contents, for persisting
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.read().clone()
    }

    /// The anti-forgery token, if the server has issued one
    pub fn csrf_token(&self) -> Option<String> {
        self.get(CSRF_COOKIE)
    }

    /// Value for a request `Cookie` header, `None` when the jar is empty
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.read();
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Take in the cookies a response set
    pub fn absorb<'a>(&self, cookies: impl Iterator<Item = reqwest::cookie::Cookie<'a>>) {
        let now = SystemTime::now();
        for cookie in cookies {
            let expired = cookie.max_age() == Some(Duration::ZERO)
                || cookie.expires().is_some_and(|at| at <= now);
            self.record(cookie.name(), cookie.value(), expired);
        }
    }

    /// Apply one `Set-Cookie`: an empty or expired cookie is a deletion
    pub(crate) fn record(&self, name: &str, value: &str, expired: bool) {
        if expired || value.is_empty() {
            tracing::debug!(cookie = name, "cookie cleared");
            self.remove(name);
        } else {
            tracing::debug!(cookie = name, "cookie stored");
            self.set(name, value);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, String>> {
        self.cookies.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, String>> {
        self.cookies.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csrf_token_reads_named_cookie() {
        let jar = CookieJar::new();
        assert_eq!(jar.csrf_token(), None);
        jar.record("sessionid", "abc", false);
        jar.record(CSRF_COOKIE, "tok123", false);
        assert_eq!(jar.csrf_token().as_deref(), Some("tok123"));
    }

    #[test]
    fn csrf_lookup_is_by_exact_name() {
        let jar = CookieJar::new();
        jar.set("xcsrftoken", "wrong");
        jar.set("csrftoken_old", "wrong");
        assert_eq!(jar.csrf_token(), None);
    }

    #[test]
    fn expired_or_empty_cookie_removes_entry() {
        let jar = CookieJar::new();
        jar.record("sessionid", "abc", false);
        jar.record("sessionid", "abc", true);
        assert_eq!(jar.get("sessionid"), None);

        jar.record("sessionid", "abc", false);
        jar.record("sessionid", "", false);
        assert!(jar.is_empty());
    }

    #[test]
    fn header_value_joins_sorted_pairs() {
        let jar = CookieJar::new();
        assert_eq!(jar.header_value(), None);
        jar.set("sessionid", "s1");
        jar.set("csrftoken", "c1");
        assert_eq!(
            jar.header_value().as_deref(),
            Some("csrftoken=c1; sessionid=s1")
        );
    }

    #[test]
    fn snapshot_round_trips_through_from_map() {
        let jar = CookieJar::new();
        jar.set("csrftoken", "c1");
        let restored = CookieJar::from_map(jar.snapshot());
        assert_eq!(restored.csrf_token().as_deref(), Some("c1"));
    }
}
