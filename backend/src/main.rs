//! Backend entry-point: wires the REST endpoints and persistence adapters.

use actix_web::web;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::DbPool;
use backend::server::{ServerArgs, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = ServerArgs::parse();
    let mut config = ServerConfig::new(args.bind_addr);
    match args.pool_config() {
        Some(pool_config) => {
            let pool = DbPool::new(pool_config)
                .await
                .map_err(|e| std::io::Error::other(format!("database pool setup failed: {e}")))?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("no DATABASE_URL configured; serving fixture data only");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %args.bind_addr, "server started");
    server.await
}
