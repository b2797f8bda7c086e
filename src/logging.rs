//! tracing subscriber setup.
//!
//! Logs go to one of: nowhere, stdout, stderr, or an append-mode file. The
//! TUI owns the terminal, so it logs to a file unless told otherwise.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive (`taskmate=debug`)
pub const LOG_ENV: &str = "TASKMATE_LOG";

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    File(PathBuf),
}

impl FromStr for LogTarget {
    type Err = std::convert::Infallible;

    /// `0`/`off`, `1`/`stdout`, `2`/`stderr`, anything else is a file path
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            path => LogTarget::File(PathBuf::from(path)),
        })
    }
}

/// Pick the filter: `$TASKMATE_LOG`, then `--verbose`, then the config
/// file, then `quiet_default`.
pub fn build_filter(configured: Option<&str>, verbose: bool, quiet_default: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    let directive = match configured {
        _ if verbose => "taskmate=debug".to_string(),
        Some(d) => d.to_string(),
        None => quiet_default.to_string(),
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(quiet_default))
}

/// Install the global subscriber
pub fn init(target: &LogTarget, filter: EnvFilter) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stdout => builder.with_writer(std::io::stdout).try_init(),
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating log directory {}", dir.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
    }
    .map_err(|e| anyhow::anyhow!("could not install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_targets() {
        assert_eq!("off".parse(), Ok(LogTarget::Off));
        assert_eq!("0".parse(), Ok(LogTarget::Off));
        assert_eq!("1".parse(), Ok(LogTarget::Stdout));
        assert_eq!("stderr".parse(), Ok(LogTarget::Stderr));
        assert_eq!(
            "/tmp/tm.log".parse(),
            Ok(LogTarget::File(PathBuf::from("/tmp/tm.log")))
        );
    }

    #[test]
    fn bad_configured_directive_falls_back() {
        // Must not panic on junk.
        let _ = build_filter(Some("[[[not a filter"), false, "warn");
    }
}
