//! Server configuration.
//!
//! CLI flags (with environment-variable fallbacks, loaded after `.env`) are
//! parsed into [`CliArgs`] and validated into the runtime [`ServerConfig`].
//! Validation happens here, at the boundary, so the rest of the server can
//! assume a well-formed configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

/// Command-line arguments for the stampede server.
#[derive(Debug, Parser)]
#[command(name = "stampede-server", version, about = "HTTP traffic generator for load testing")]
pub struct CliArgs {
    /// Address the API listens on.
    #[arg(long, env = "STAMPEDE_ADDR", default_value = "0.0.0.0:2626")]
    pub addr: String,

    /// Upper cap on a single job's worker-pool size.
    #[arg(long, env = "STAMPEDE_MAX_POOL_SIZE", default_value_t = 1024)]
    pub max_pool_size: usize,

    /// Per-request timeout for outbound GETs, in seconds.
    #[arg(long, env = "STAMPEDE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

/// Validated runtime configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub max_pool_size: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("max pool size must be at least 1")]
    ZeroPoolCap,
    #[error("request timeout must be at least 1 second")]
    ZeroTimeout,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let addr = args
            .addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                addr: args.addr.clone(),
                source,
            })?;
        if args.max_pool_size == 0 {
            return Err(ConfigError::ZeroPoolCap);
        }
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            addr,
            max_pool_size: args.max_pool_size,
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        })
    }
}
