use crate::error::ConfigError;
use crate::record::DEFAULT_LEVEL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// chrono rendering of `yyyy-MM-dd HH:mm:ss.SSSZ`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f%z";

/// Settings stored under one named profile by a [`ConfigProvider`].
///
/// Missing booleans default to `false`, a missing hostname to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    pub endpoint_url: String,
    pub include_hostname: bool,
    pub hostname: String,
    pub batch_mode_enabled: bool,
    pub default_level: Option<String>,
    pub date_format: Option<String>,
}

/// Source of named settings profiles.
///
/// The logger only ever asks for one profile, once, when its
/// configuration is resolved.
pub trait ConfigProvider: Send + Sync {
    /// Look up a profile by name. `None` means the profile does not exist.
    fn settings(&self, profile: &str) -> Option<ProfileSettings>;
}

/// Fully resolved configuration shared by the encoder and dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub default_level: String,
    pub date_format: String,
    pub endpoint_url: String,
    pub include_hostname: bool,
    pub hostname: String,
    pub batch_mode_enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_LEVEL.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            endpoint_url: String::new(),
            include_hostname: false,
            hostname: String::new(),
            batch_mode_enabled: false,
        }
    }
}

impl From<ProfileSettings> for LogConfig {
    fn from(settings: ProfileSettings) -> Self {
        let defaults = LogConfig::default();
        LogConfig {
            default_level: settings.default_level.unwrap_or(defaults.default_level),
            date_format: settings.date_format.unwrap_or(defaults.date_format),
            endpoint_url: settings.endpoint_url,
            include_hostname: settings.include_hostname,
            hostname: settings.hostname,
            batch_mode_enabled: settings.batch_mode_enabled,
        }
    }
}

impl LogConfig {
    /// Resolve `profile` through `provider`.
    ///
    /// An unknown profile is not fatal: the result has an empty endpoint,
    /// so every later send fails at the transport and is logged there.
    pub fn resolve(provider: &dyn ConfigProvider, profile: &str) -> Self {
        match Self::try_resolve(provider, profile) {
            Ok(config) => config,
            Err(e) => {
                warn!(profile, error = %e, "log shipping profile missing, sends will fail");
                LogConfig::default()
            }
        }
    }

    /// Strict variant of [`LogConfig::resolve`].
    pub fn try_resolve(provider: &dyn ConfigProvider, profile: &str) -> Result<Self, ConfigError> {
        let settings = provider
            .settings(profile)
            .ok_or_else(|| ConfigError::UnknownProfile(profile.to_string()))?;
        debug!(profile, endpoint = %settings.endpoint_url, "resolved log shipping profile");
        Ok(settings.into())
    }

    /// Whether encoded records carry a `"host"` member.
    pub fn emits_host(&self) -> bool {
        self.include_hostname && !self.hostname.is_empty()
    }
}

/// In-memory profile table, usually built in tests or loaded from JSON.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    profiles: HashMap<String, ProfileSettings>,
}

impl StaticConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, name: impl Into<String>, settings: ProfileSettings) -> Self {
        self.profiles.insert(name.into(), settings);
        self
    }

    /// Parse a JSON object mapping profile names to settings, e.g.
    /// `{"default": {"endpoint_url": "https://logs.example.com/ingest"}}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let profiles: HashMap<String, ProfileSettings> = serde_json::from_str(json)?;
        Ok(Self { profiles })
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn settings(&self, profile: &str) -> Option<ProfileSettings> {
        self.profiles.get(profile).cloned()
    }
}

/// Resolve-once cell over a provider and profile name.
///
/// The first call to [`LazyConfig::get`] consults the provider; every
/// later call returns the same [`Arc`] without re-reading it.
pub struct LazyConfig {
    provider: Box<dyn ConfigProvider>,
    profile: String,
    cell: OnceLock<Arc<LogConfig>>,
}

impl LazyConfig {
    pub fn new(provider: impl ConfigProvider + 'static, profile: impl Into<String>) -> Self {
        LazyConfig {
            provider: Box::new(provider),
            profile: profile.into(),
            cell: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Arc<LogConfig> {
        self.cell
            .get_or_init(|| Arc::new(LogConfig::resolve(&*self.provider, &self.profile)))
            .clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}
