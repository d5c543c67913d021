// Income Rank - Web Server
// REST API with Axum

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use income_rank::api::{router, AppState};
use income_rank::{logging, Config, RankService};

#[derive(Parser)]
#[command(name = "income-rank-server")]
#[command(about = "HTTP API for income percentile lookups")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "INCOME_RANK_CONFIG", default_value = "income-rank.toml")]
    config: PathBuf,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "INCOME_RANK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Port to listen on (overrides the port in bind_addr)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = Config::load(Some(cli.config.as_path()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(port) = cli.port {
        config.server.bind_addr = format!("0.0.0.0:{}", port);
    }

    tracing::info!("Loading census data from {:?}", config.data.data_dir);
    let service = RankService::load(&config)?;

    // Store is read-only from here on
    let state = AppState {
        service: Arc::new(service),
        default_geography: config.data.default_geography.clone(),
    };

    let cors = match &config.server.cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))?,
        ),
        None => CorsLayer::permissive(),
    };

    let app = router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_addr))?;

    tracing::info!("Server running on http://{}", config.server.bind_addr);
    tracing::info!("   API: http://{}/api/income/percentile?income=50000", config.server.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
