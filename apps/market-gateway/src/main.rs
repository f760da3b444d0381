//! Market Gateway Binary
//!
//! Serves quotes, bars, account data and order routing over HTTP.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-gateway
//! ```
//!
//! # Environment Variables
//!
//! - `GATEWAY_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//! - Any `${VAR}` referenced by the config file, e.g. `ALPACA_KEY`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use market_gateway::config::{Config, load_config};
use market_gateway::observability::{init_metrics, init_tracing};
use market_gateway::{
    AlpacaProvider, AppState, CacheStore, RateThrottle, RequestRouter, RouterConfig,
    StaticCredentialResolver, YahooQuoteClient, create_router,
};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config = load_config(None).context("failed to load configuration")?;
    init_tracing(&config.observability.logging).context("failed to initialize tracing")?;

    tracing::info!("Starting Market Gateway");
    log_config(&config);

    if config.observability.metrics.enabled {
        let addr: SocketAddr = config
            .observability
            .metrics
            .listen_addr
            .parse()
            .context("invalid metrics listen address")?;
        init_metrics(addr).context("failed to start metrics exporter")?;
        tracing::info!(addr = %addr, "Prometheus exporter listening");
    }

    let primary = AlpacaProvider::new(config.alpaca.to_alpaca_config())
        .context("failed to build Alpaca client")?;
    let fallback = YahooQuoteClient::new(&config.fallback.to_yahoo_config())
        .context("failed to build fallback client")?;
    let credentials = StaticCredentialResolver::new(config.alpaca.default_credentials());
    if !credentials.has_default() {
        tracing::warn!("No default Alpaca credentials; anonymous callers get delayed quotes only");
    }

    let router = RequestRouter::new(
        Arc::new(primary),
        Arc::new(fallback),
        Arc::new(credentials),
        Arc::new(CacheStore::new(config.cache.to_cache_config())),
        Arc::new(RateThrottle::new(config.throttle.min_delay())),
        RouterConfig {
            request_timeout: config.server.request_timeout(),
            fallback_enabled: config.fallback.enabled,
        },
    );

    let state = AppState {
        router: Arc::new(router),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let app = create_router(state);

    let http_addr = config.server.http_addr();
    let listener = TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;
    tracing::info!(addr = %http_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Market Gateway stopped");
    Ok(())
}

/// Load `.env` if present. Missing files are not an error.
fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: failed to load .env: {e}");
    }
}

fn log_config(config: &Config) {
    tracing::info!(
        environment = %config.alpaca.environment,
        http_port = config.server.http_port,
        fresh_ttl_secs = config.cache.fresh_ttl_secs,
        stale_ttl_secs = config.cache.stale_ttl_secs,
        throttle_ms = config.throttle.min_delay_ms,
        fallback_enabled = config.fallback.enabled,
        "Configuration loaded"
    );

    if config.alpaca.environment.is_live() {
        tracing::warn!("LIVE trading environment - orders will execute with real money");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
