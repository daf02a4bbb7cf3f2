use std::error::Error;

/// Reasons a dispatch can fail.
///
/// These never leave the dispatcher: every variant is logged and the
/// payload is dropped. They exist so the diagnostic line says what went
/// wrong.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync>),

    #[error("endpoint responded with HTTP {0}")]
    Status(u16),

    #[error("injected test failure")]
    InjectedFailure,

    #[error("no async runtime available to schedule the send")]
    NoRuntime,
}

/// Errors raised while loading or resolving configuration profiles.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unknown configuration profile: {0}")]
    UnknownProfile(String),

    #[error("invalid profile document: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
