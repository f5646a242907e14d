use toolkit_logger::{global, kv, MetaEnv};

/// Reads `APP_ENV`, `APP_SERVICE`, `APP_LOG_PATH`, ... and logs accordingly.
/// Try `APP_ENV=prod APP_LOG_PATH=/tmp/lemon/ cargo run --example file_sink`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let meta = MetaEnv::from_env()?;
    let logger = global::init_logger(&meta)?;

    global::info_kv("startup", &[kv("version", "1.0.0")]);
    // The handle can be passed around instead of using the free functions.
    logger.warnf(format_args!("disk usage at {}%", 91));

    global::close()?;
    Ok(())
}
