use dx_companion::app::{App, Devices};
use dx_companion::config::Config;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = Config::load();
    tracing::info!(
        "Spot feed {}:{} as {}",
        config.telnet.host,
        config.telnet.port,
        config.telnet.username
    );

    let mut app = App::new(config, Devices::console(), Instant::now());
    if let Some(path) = Config::config_path() {
        app = app.persist_to(path);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");
    rt.block_on(app.run());
}
