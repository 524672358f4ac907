use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use trivia_api::{build_router, logging, AppState, Config, DatabaseService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    logging::init(config.log_level).context("Failed to initialize logging")?;

    // 初始化数据库
    let db_path = config.database_path();
    let db = DatabaseService::open(&db_path)
        .with_context(|| format!("Failed to open database at {:?}", db_path))?;

    if config.seed_categories {
        db.seed_default_categories()
            .context("Failed to seed default categories")?;
    }

    let app = build_router(AppState::new(db));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    log::info!("Server running on: {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
