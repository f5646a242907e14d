use crate::error::LogError;
use crate::layer::LoggerLayer;
use crate::logger::Logger;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the `tracing` bridge.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top of [`LoggerLayer`] and events are also printed in the
///   default `fmt` layout. Off by default, since a development logger
///   already writes to stdout.
#[derive(Clone, Debug, Default)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

/// Install a global `tracing` subscriber that feeds `logger`.
///
/// **Parameters**
/// - `logger`: receives every event admitted by its own level.
/// - `config`: [`LayerConfig`] controlling extra layers.
///
/// **Returns**
/// - `Err(LogError::Subscriber)` if a global subscriber is already set.
pub fn init_tracing_with_config(logger: Arc<Logger>, config: LayerConfig) -> Result<(), LogError> {
    let layer = LoggerLayer::new(logger);

    // The two subscriber shapes have different types, hence two branches.
    let result = if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| LogError::Subscriber(e.to_string()))
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(logger: Arc<Logger>) -> Result<(), LogError> {
    init_tracing_with_config(logger, LayerConfig::default())
}
