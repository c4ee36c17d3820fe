use clap::Parser;
use spark_joy::config::AppConfig;
use spark_joy::server::{build_router, AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "server", about = "Spark Joy web server")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "spark-joy.toml")]
    config: PathBuf,

    /// Listen address override
    #[arg(short, long, env = "SPARK_JOY_LISTEN")]
    listen: Option<String>,

    /// Data directory override
    #[arg(short, long, env = "SPARK_JOY_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut cfg = AppConfig::load_or_default(&cli.config)?;
    if let Some(listen) = cli.listen {
        cfg.listen_addr = listen;
    }
    if let Some(data_dir) = cli.data_dir {
        cfg.data_dir = data_dir;
    }

    let state = AppState::open(&cfg)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!(
        "Spark Joy running on http://{} (data in {})",
        cfg.listen_addr,
        cfg.data_dir.display()
    );
    axum::serve(listener, app).await?;

    Ok(())
}
