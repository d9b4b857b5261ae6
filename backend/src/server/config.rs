//! Server configuration object and command line parsing.

use std::net::SocketAddr;

use clap::Parser;

use crate::outbound::persistence::{DbPool, PoolConfig};

/// Command line and environment options for the backend binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Animal scheduling backend")]
pub struct ServerArgs {
    /// PostgreSQL connection string. When absent the server runs on fixture
    /// ports and persists nothing.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Socket address to bind.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Maximum database connections held by the pool.
    #[arg(long, env = "DB_MAX_POOL_SIZE", default_value_t = 10)]
    pub max_pool_size: u32,

    /// Minimum idle connections kept warm by the pool.
    #[arg(long, env = "DB_MIN_IDLE")]
    pub min_idle: Option<u32>,
}

impl ServerArgs {
    /// Pool configuration derived from the arguments, if a database was
    /// configured.
    #[must_use]
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            PoolConfig::new(url.clone())
                .with_max_size(self.max_pool_size)
                .with_min_idle(self.min_idle)
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration binding the given address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server wires database-backed implementations of
    /// the domain ports; otherwise fixtures are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_absent_without_database_url() {
        let args = ServerArgs::parse_from(["backend"]);
        assert!(args.pool_config().is_none());
        assert_eq!(args.bind_addr, "0.0.0.0:8080".parse().expect("addr"));
    }

    #[test]
    fn pool_config_carries_sizing() {
        let args = ServerArgs::parse_from([
            "backend",
            "--database-url",
            "postgres://localhost/zoo",
            "--max-pool-size",
            "4",
            "--min-idle",
            "1",
        ]);
        let config = args.pool_config().expect("pool config");
        assert_eq!(config.max_size(), 4);
        assert_eq!(config.min_idle(), Some(1));
    }
}
