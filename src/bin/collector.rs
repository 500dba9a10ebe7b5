use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use log_metrics_collector::{
    Collector,
    config::{Config, load_config},
};
use tracing::{error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Host metrics and log file collector with a REST API
#[derive(Debug, Clone, Parser)]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the API port
    #[arg(short, long)]
    port: Option<u16>,

    /// Run without the REST API (console mode only)
    #[arg(long)]
    no_api: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

fn init(level: LogLevel) {
    dotenv::dotenv().ok();

    let level = LevelFilter::from(level);
    let filter = filter::Targets::new().with_targets(vec![
        ("log_metrics_collector", level),
        ("collector", level),
        ("tower_http", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();
}

fn build_config(args: &Args) -> Config {
    let mut config = load_config(&args.config).with_env_overrides();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init(args.log_level);
    trace!("started with args: {args:?}");

    let config = build_config(&args);
    let interval = config.metrics_interval();
    let collector = Arc::new(Collector::new(config));

    collector.start(interval).await;

    if args.no_api {
        info!("running in console mode (no API server)");
    } else {
        serve_api(&collector).await;
    }

    info!("press Ctrl+C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
    }

    collector.stop().await;

    info!("monitoring session summary");
    for line in collector.summary().to_string().lines() {
        info!("{line}");
    }

    Ok(())
}

#[cfg(feature = "api")]
async fn serve_api(collector: &Arc<Collector>) {
    use log_metrics_collector::api::{ApiConfig, ApiState, spawn_api_server};

    let api_config = ApiConfig::from(&collector.config().api);
    match spawn_api_server(api_config, ApiState::new(collector.clone())).await {
        Ok(addr) => info!("API documentation available at http://{addr}/"),
        Err(e) => error!("failed to start API server, continuing without it: {e:#}"),
    }
}

#[cfg(not(feature = "api"))]
async fn serve_api(_collector: &Arc<Collector>) {
    tracing::warn!("built without the `api` feature, running in console mode");
}
