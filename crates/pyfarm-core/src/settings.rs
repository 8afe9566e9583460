//! Typed, env-driven configuration, resolved once at startup.
//!
//! Every knob is optional in the environment; a missing or malformed value
//! falls back to its documented default rather than failing startup.

use std::path::PathBuf;
use std::time::Duration;

/// Resolved scheduler configuration, threaded by `Arc` through every
/// component rather than read ambiently from the environment at each call
/// site.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mail_server: Option<String>,
    pub mail_from_address: Option<String>,
    pub database_uri: Option<String>,

    pub scheduler_rate_limit: Duration,
    pub poll_busy_agents_interval: Duration,
    pub poll_idle_agents_interval: Duration,
    pub agent_request_timeout: Duration,
    pub transaction_retries: u32,
    pub dispatch_max_retries: u32,

    pub logfiles_dir: PathBuf,
    /// Retained for interface parity with the environment-configurable
    /// knob of the same name; unused by the in-process agent lock registry.
    pub scheduler_lockfile_base: Option<PathBuf>,

    pub use_total_ram_for_scheduling: bool,
    pub prefer_running_jobs: bool,
    pub allow_agents_from_loopback: bool,
}

impl Settings {
    /// Resolve every knob from the environment, logging a warning and
    /// falling back to the default for anything missing or malformed.
    pub fn from_env() -> Self {
        Self {
            mail_server: env_string("PYFARM_MAIL_SERVER"),
            mail_from_address: env_string("PYFARM_FROM_ADDRESS"),
            database_uri: env_string("PYFARM_DATABASE_URI"),

            scheduler_rate_limit: env_duration_ms("PYFARM_SCHEDULER_RATE_LIMIT_MS", Duration::from_secs(1)),
            poll_busy_agents_interval: env_duration_secs("PYFARM_POLL_BUSY_AGENTS_INTERVAL", Duration::from_secs(600)),
            poll_idle_agents_interval: env_duration_secs("PYFARM_POLL_IDLE_AGENTS_INTERVAL", Duration::from_secs(3600)),
            agent_request_timeout: env_duration_ms("PYFARM_AGENT_REQUEST_TIMEOUT_MS", Duration::from_secs(30)),
            transaction_retries: env_u32("PYFARM_TRANSACTION_RETRIES", 3),
            dispatch_max_retries: env_u32("PYFARM_DISPATCH_MAX_RETRIES", 3),

            logfiles_dir: env_string("PYFARM_LOGFILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/var/log/pyfarm/tasks")),
            scheduler_lockfile_base: env_string("PYFARM_SCHEDULER_LOCKFILE_BASE").map(PathBuf::from),

            use_total_ram_for_scheduling: env_bool("PYFARM_USE_TOTAL_RAM_FOR_SCHEDULING", false),
            prefer_running_jobs: env_bool("PYFARM_PREFER_RUNNING_JOBS", true),
            allow_agents_from_loopback: env_bool("PYFARM_ALLOW_AGENTS_FROM_LOOPBACK", false),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(%key, value = %v, "unrecognized boolean env value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!(%key, value = %v, "unparseable integer env value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn env_duration_ms(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .unwrap_or_else(|_| {
                tracing::warn!(%key, value = %v, "unparseable duration env value, using default");
                default
            }),
        Err(_) => default,
    }
}

fn env_duration_secs(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .unwrap_or_else(|_| {
                tracing::warn!(%key, value = %v, "unparseable duration env value, using default");
                default
            }),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
