mod api;
mod app;
mod config;
mod constants;
mod input;
mod route;
mod ui;

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::ApiClient;
use crate::app::App;
use crate::config::Config;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mailpeek=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("mailpeek.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        // Log to file
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"mailpeek - Terminal viewer for a captured-mail store

Usage: mailpeek [url]

Arguments:
    url         API base URL (default: {default}, or [api].url in config)

Options:
    -h, --help  Show this help message

Configuration file: ~/.config/mailpeek/config.toml
"#,
        default = constants::DEFAULT_API_URL
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let url_override = match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            return Ok(());
        }
        Some(arg) if arg.starts_with('-') => {
            eprintln!("Unknown option: {}", arg);
            print_usage();
            std::process::exit(1);
        }
        Some(url) => Some(url.to_string()),
        None => None,
    };

    setup_logging();

    let config = Config::load()?;
    config.ensure_dirs()?;

    let base_url = url_override.unwrap_or_else(|| config.api.url.clone());
    let client = ApiClient::new(&base_url);
    tracing::info!(url = client.base_url(), "starting mailpeek");

    let mut app = App::new(&config, client);
    app.run().await
}
