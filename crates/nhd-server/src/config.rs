//! Server configuration loading.
//!
//! Layers, lowest precedence first: built-in defaults, `NHD_*` environment
//! variables, command-line flags.

use anyhow::{Context, Result};
use clap::Parser;
use nhd_gateway::{parse_duration, parse_static_tokens, GatewayConfig, StaticToken};
use std::net::IpAddr;
use std::time::Duration;

/// NHD report backend
#[derive(Parser, Debug, Default)]
#[command(name = "nhd-server")]
#[command(about = "HTTP backend for customers, report runs and financials")]
pub struct Args {
    /// Bind address
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Sustained request rate (requests per second, may be fractional)
    #[arg(long = "ratelimit-rps")]
    pub ratelimit_rps: Option<f64>,

    /// Token bucket burst size
    #[arg(long = "ratelimit-burst")]
    pub ratelimit_burst: Option<u32>,

    /// Per-request timeout, e.g. "30s" or "500ms"
    #[arg(long = "server-timeout", value_parser = parse_timeout)]
    pub server_timeout: Option<Duration>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

/// Everything the binary needs to start.
#[derive(Debug)]
pub struct ServerConfig {
    pub gateway: GatewayConfig,
    pub static_tokens: Vec<StaticToken>,
}

/// Build the configuration from the process environment and `args`.
pub fn load_config(args: &Args) -> Result<ServerConfig> {
    load_config_from(args, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an injectable variable lookup.
pub fn load_config_from<F>(args: &Args, var: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GatewayConfig::default();

    // Environment overrides
    if let Some(host) = var("NHD_HOST") {
        config.http.host = host.parse().context("NHD_HOST must be an IP address")?;
    }
    if let Some(port) = var("NHD_PORT") {
        config.http.port = port.parse().context("NHD_PORT must be a port number")?;
    }
    if let Some(rps) = var("NHD_RATELIMIT_RPS") {
        config.rate_limit.requests_per_second =
            rps.parse().context("NHD_RATELIMIT_RPS must be a number")?;
    }
    if let Some(burst) = var("NHD_RATELIMIT_BURST") {
        config.rate_limit.burst_size = burst
            .parse()
            .context("NHD_RATELIMIT_BURST must be a positive integer")?;
    }
    if let Some(timeout) = var("NHD_SERVER_TIMEOUT") {
        config.timeouts.request = parse_duration(&timeout).context("NHD_SERVER_TIMEOUT")?;
    }
    if let Some(topic) = var("NHD_REPORT_TOPIC") {
        config.publisher.topic = topic;
    }
    if let Some(origins) = var("NHD_CORS_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    // Command-line overrides
    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(rps) = args.ratelimit_rps {
        config.rate_limit.requests_per_second = rps;
    }
    if let Some(burst) = args.ratelimit_burst {
        config.rate_limit.burst_size = burst;
    }
    if let Some(timeout) = args.server_timeout {
        config.timeouts.request = timeout;
    }

    config.validate().context("invalid configuration")?;

    let static_tokens = match var("NHD_STATIC_TOKENS") {
        Some(raw) => parse_static_tokens(&raw).context("NHD_STATIC_TOKENS")?,
        None => Vec::new(),
    };

    Ok(ServerConfig {
        gateway: config,
        static_tokens,
    })
}
