use crate::layer::{LayerHandle, RemoteLogLayer, INTERNAL_TARGETS};
use crate::logger::BatchLogger;
use tokio::runtime::Handle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the `tracing` bridge.
///
/// **Fields**
/// - `min_level`: least severe level forwarded to the endpoint.
/// - `flush_interval`: when set and batch mode is on, a background task
///   flushes the shared batch on this period.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to [`RemoteLogLayer`], which also makes this crate's
///   own diagnostics visible.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Level,
    pub flush_interval: Option<Duration>,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::INFO,
            flush_interval: Some(Duration::from_secs(1)),
            enable_stdout: true,
        }
    }
}

/// Install a global `tracing` subscriber that ships events through
/// `logger`.
///
/// **Returns**
/// - `Ok(handle)` for flushing the shared batch, e.g. before shutdown.
/// - `Err(..)` if a global subscriber was already set.
pub fn init_tracing_with_config(
    logger: BatchLogger,
    config: LayerConfig,
) -> Result<LayerHandle, tracing::subscriber::SetGlobalDefaultError> {
    let (layer, handle) = RemoteLogLayer::new(
        logger.clone(),
        config.min_level,
        INTERNAL_TARGETS.iter().copied(),
    );

    // The two subscriber shapes have different types, hence two branches.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    if let Some(period) = config.flush_interval {
        spawn_periodic_flush(&logger, handle.clone(), period);
    }

    Ok(handle)
}

/// Install the bridge with [`LayerConfig::default`].
pub fn init_tracing(
    logger: BatchLogger,
) -> Result<LayerHandle, tracing::subscriber::SetGlobalDefaultError> {
    init_tracing_with_config(logger, LayerConfig::default())
}

fn spawn_periodic_flush(logger: &BatchLogger, handle: LayerHandle, period: Duration) {
    if !logger.batch_mode() {
        return;
    }
    let Ok(runtime) = Handle::try_current() else {
        warn!("no tokio runtime, the tracing batch is only flushed on demand");
        return;
    };

    let period = period.max(Duration::from_millis(10));
    runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            handle.flush();
        }
    });
}
