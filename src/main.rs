mod app;
mod browse;
mod carousel;
mod catalog;
mod config;
mod detail;
mod error;
mod player;
mod search;
mod ui;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::App;
use crate::catalog::TmdbClient;
use crate::config::Config;
use crate::error::Result;

fn setup_logging() -> Result<()> {
    let data_dir = config::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    let file_appender = tracing_appender::rolling::daily(&data_dir, "bingepoint.log");

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "bingepoint=info".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file; the TUI owns the terminal
    if let Err(e) = setup_logging() {
        eprintln!("Warning: Could not set up logging: {}", e);
    }

    info!("Starting bingepoint");

    let config = Config::load()?;
    config.validate()?;
    info!(base_url = %config.catalog.base_url, "Loaded config");

    let client = TmdbClient::new(config.catalog.clone());

    let mut terminal = app::init_terminal()?;

    let mut app = App::new(config, Arc::new(client));
    let result = app.run(&mut terminal).await;

    app::restore_terminal()?;

    result
}
