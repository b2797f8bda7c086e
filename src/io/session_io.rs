use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::config_io::ConfigError;
use crate::api::{ApiError, CookieJar, HttpClient, parse_base_url};

/// Persisted session cookies (written to session.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    /// The server these cookies belong to
    pub base_url: String,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

/// Directory for state that should survive between runs:
/// `$XDG_STATE_HOME/taskmate`, else `~/.local/state/taskmate`
pub fn state_dir() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| super::home_dir().join(".local").join("state"))
        .join("taskmate")
}

pub fn session_path() -> PathBuf {
    state_dir().join("session.json")
}

/// Read a session file. Missing or malformed files read as no session.
pub fn read_session(path: &Path) -> Option<SessionFile> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
            None
        }
    }
}

pub fn write_session(path: &Path, session: &SessionFile) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(session)?;
    super::write_atomic(path, &content)
}

/// Forget the saved session. A missing file is not an error.
pub fn clear_session(path: &Path) -> Result<(), ConfigError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Load the cookie jar saved for `base_url`. A session saved for a
/// different server is ignored.
pub fn restore_jar(path: &Path, base_url: &str) -> CookieJar {
    match read_session(path) {
        Some(session) if session.base_url == base_url => {
            debug!(cookies = session.cookies.len(), "restored session");
            CookieJar::from_map(session.cookies)
        }
        Some(_) => {
            debug!("saved session belongs to another server");
            CookieJar::new()
        }
        None => CookieJar::new(),
    }
}

/// Save the jar for `base_url`; an empty jar clears the file instead
pub fn save_jar(path: &Path, base_url: &str, jar: &CookieJar) -> Result<(), ConfigError> {
    if jar.is_empty() {
        return clear_session(path);
    }
    write_session(
        path,
        &SessionFile {
            base_url: base_url.to_string(),
            cookies: jar.snapshot(),
        },
    )
}

/// Build a client for `base_url` carrying whatever session was saved for it
pub fn connect(base_url: &str, path: &Path) -> Result<HttpClient, ApiError> {
    let base = parse_base_url(base_url)?;
    let jar = restore_jar(path, base.as_str());
    HttpClient::with_jar(base.as_str(), Arc::new(jar))
}

/// Save the client's current cookies back to `path`
pub fn persist(client: &HttpClient, path: &Path) -> Result<(), ConfigError> {
    save_jar(path, client.base_url().as_str(), client.jar())
}
