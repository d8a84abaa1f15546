use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use foodfusion::{AppConfig, FoodFusionBuilder, RepositoryProvider};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line interface for the FoodFusion backend
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string, overrides FOODFUSION_DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Apply pending migrations before serving
        #[arg(long)]
        migrate: bool,

        /// Identify clients by Client-IP and X-Forwarded-For; only behind a trusted proxy
        #[arg(long)]
        trust_proxy_headers: bool,
    },
    /// Run database migrations
    Migrate,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,foodfusion=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Failed to read configuration")?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    match cli.command {
        Commands::Serve {
            migrate,
            trust_proxy_headers,
        } => serve(config, migrate, trust_proxy_headers).await,
        Commands::Migrate => {
            tracing::info!(database_url = %config.database_url, "Running migrations");
            let provider = foodfusion::connect_sqlite(&config.database_url).await?;
            provider.migrate().await.context("Migration failed")?;
            tracing::info!("Migrations complete");
            Ok(())
        }
        Commands::Version => {
            println!("FoodFusion v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, migrate: bool, trust_proxy_headers: bool) -> anyhow::Result<()> {
    let jwt = config.jwt_config()?;

    let app = FoodFusionBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .with_jwt(jwt)
        .with_guard_config(config.guard.clone())
        .apply_migrations(migrate)
        .build()
        .await?;
    let app = Arc::new(app);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let cleanup = app.start_cleanup_task(shutdown_rx);

    let router = foodfusion_axum::routes(app)
        .trust_proxy_headers(trust_proxy_headers)
        .build();

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "FoodFusion listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    let _ = shutdown_tx.send(true);
    cleanup.await?;
    tracing::info!("FoodFusion stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
