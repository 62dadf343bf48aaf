mod app;
mod config;
mod controller;
mod errors;
mod gestures;
mod messages;
mod permissions;
mod platform;
mod services;
mod view;

use app::App;
use config::Config;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, stdout is the screen
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting clipcam");

    let config = Config::load()?;
    config.validate()?;

    App::new(config)?.run().await
}
