pub mod record;
pub mod config;
pub mod env;
pub mod error;
pub mod encoder;
pub mod batch;
pub mod sink;
pub mod fault;
pub mod dispatch;
pub mod logger;
pub mod layer;

#[cfg(feature = "http")]
pub mod http;

pub mod init;
pub mod noop_sink;

pub use batch::LogBatch;
pub use config::{ConfigProvider, LazyConfig, LogConfig, ProfileSettings, StaticConfigProvider};
pub use dispatch::Dispatcher;
pub use encoder::Encoder;
pub use logger::{BatchLogger, Disposition, Session};
pub use record::LogRecord;
