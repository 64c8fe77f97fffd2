use anyhow::Result;
use clap::Parser;
use mock_array::{MockConfig, MockServer};
use std::path::PathBuf;
use std::sync::Once;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let format =
            std::env::var("MOCK_ARRAY_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

        if format.eq_ignore_ascii_case("json") {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter.clone())
                .with_target(true)
                .json()
                .flatten_event(true)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .compact()
                .init();
        }
    });
}

#[derive(Parser)]
#[command(name = "mock-array")]
#[command(about = "Stateful mock of the Unisphere REST API for PowerMax", long_about = None)]
struct Cli {
    /// YAML config file; defaults apply when omitted
    #[arg(short, long, env = "MOCK_ARRAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port, overrides the config file and MOCK_ARRAY_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Listen address, overrides the config file and MOCK_ARRAY_LISTEN_ADDR
    #[arg(long)]
    listen_addr: Option<String>,
}

fn load_config(cli: &Cli) -> Result<MockConfig> {
    let base = match &cli.config {
        Some(path) => MockConfig::from_yaml_file(path)?,
        None => MockConfig::default(),
    };
    let mut config = base.with_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(addr) = &cli.listen_addr {
        config.listen_addr = addr.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(bind = %config.bind_addr(), arrays = ?config.arrays, "starting mock array");

    MockServer::new(config)
        .run(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, shutting down");
            }
        })
        .await
}
