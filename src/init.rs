use crate::config::LoggerConfig;
use crate::error::Result;
use crate::layer::DailyLogLayer;
use crate::logger::{self, Logger};
use crate::router::FileRouter;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Start the process-wide logger and route `tracing` events into it.
///
/// **Parameters**
/// - `config`: [`LoggerConfig`] for the flusher; `enable_stdout` also adds
///   a `fmt` layer printing every event to the console.
/// - `router`: where the info and error files live.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`DailyLogLayer`] as the global
/// default subscriber, so `tracing::info!`/`tracing::error!` anywhere in the
/// process end up in the daily files next to `log_info!`/`log_error!`.
///
/// **Errors**
/// - [`Error::AlreadyInitialized`](crate::Error::AlreadyInitialized) if the
///   process-wide logger already exists.
/// - [`Error::SetTracing`](crate::Error::SetTracing) if another global
///   subscriber was installed first.
pub fn init_tracing_with_config(config: LoggerConfig, router: FileRouter) -> Result<&'static Arc<Logger>> {
    let logger = logger::init(&config, router)?;
    let layer = DailyLogLayer::new(Arc::clone(logger));

    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(logger)
}

/// Initialize with configuration taken from the environment.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LoggerConfig::from_env`] and [`FileRouter::from_env`].
pub fn init_tracing() -> Result<&'static Arc<Logger>> {
    init_tracing_with_config(LoggerConfig::from_env(), FileRouter::from_env())
}
