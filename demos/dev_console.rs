use toolkit_logger::{global, infof, kv, AppEnv, MetaEnv};

#[derive(Debug, thiserror::Error)]
#[error("upstream timed out")]
struct Timeout;

fn main() -> Result<(), toolkit_logger::LogError> {
    let meta = MetaEnv::new().with_service("lemon").with_env(AppEnv::Dev);
    global::init_logger(&meta)?;

    infof!("server running on port {}", 111);
    global::debug_kv("config loaded", &[kv("workers", 4), kv("tls", false)]);
    global::warn_err("retrying request", &Timeout, &[kv("attempt", 2)]);

    global::close()
}
