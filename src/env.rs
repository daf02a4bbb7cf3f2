//! Environment variable names used by this crate for convenient
//! configuration of the logger from microservices.
//!
//! Every variable is scoped by profile: for profile `orders` the endpoint
//! is read from `LOG_BATCH_ORDERS_ENDPOINT_URL`.

use crate::config::{ConfigProvider, ProfileSettings};

/// Prefix shared by all profile-scoped variables.
pub const LOG_BATCH_ENV_PREFIX: &str = "LOG_BATCH";

/// Ingestion endpoint URL, e.g. `https://logs.example.com/ingest`.
pub const ENDPOINT_URL_SUFFIX: &str = "ENDPOINT_URL";

/// `true`/`1` to add the `"host"` member to every record.
pub const INCLUDE_HOSTNAME_SUFFIX: &str = "INCLUDE_HOSTNAME";

/// Hostname reported when inclusion is on.
pub const HOSTNAME_SUFFIX: &str = "HOSTNAME";

/// `true`/`1` to enable batching mode.
pub const BATCH_MODE_SUFFIX: &str = "BATCH_MODE";

/// Level used for records logged without one.
pub const DEFAULT_LEVEL_SUFFIX: &str = "DEFAULT_LEVEL";

/// chrono format string for the `"datetime"` member.
pub const DATE_FORMAT_SUFFIX: &str = "DATE_FORMAT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Full variable name for `suffix` under `profile`.
pub fn profile_var(profile: &str, suffix: &str) -> String {
    let profile = profile.to_ascii_uppercase().replace(['-', '.', ' '], "_");
    format!("{LOG_BATCH_ENV_PREFIX}_{profile}_{suffix}")
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// [`ConfigProvider`] backed by process environment variables.
///
/// A profile exists when its endpoint variable is set. The hostname
/// falls back to the conventional `HOSTNAME` variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigProvider;

impl ConfigProvider for EnvConfigProvider {
    fn settings(&self, profile: &str) -> Option<ProfileSettings> {
        let var = |suffix: &str| std::env::var(profile_var(profile, suffix)).ok();

        let endpoint_url = var(ENDPOINT_URL_SUFFIX)?;
        Some(ProfileSettings {
            endpoint_url,
            include_hostname: var(INCLUDE_HOSTNAME_SUFFIX).is_some_and(|v| parse_flag(&v)),
            hostname: var(HOSTNAME_SUFFIX).unwrap_or_else(|| env_or("HOSTNAME", "")),
            batch_mode_enabled: var(BATCH_MODE_SUFFIX).is_some_and(|v| parse_flag(&v)),
            default_level: var(DEFAULT_LEVEL_SUFFIX),
            date_format: var(DATE_FORMAT_SUFFIX),
        })
    }
}
