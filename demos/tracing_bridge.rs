use std::sync::Arc;

use toolkit_logger::init::{init_tracing_with_config, LayerConfig};
use toolkit_logger::{Format, Level, Logger, LoggerConfig};

fn main() -> Result<(), toolkit_logger::LogError> {
    let config = LoggerConfig {
        level: Level::Info,
        format: Format::Json,
        ..LoggerConfig::default()
    }
    .with_field("service", "auth-service");
    let logger = Arc::new(Logger::new(std::io::stdout(), config)?);

    init_tracing_with_config(Arc::clone(&logger), LayerConfig::default())?;

    tracing::info!("starting service");
    tracing::error!(user_id = 42, reason = "invalid password", "authentication failed");

    logger.close()
}
