use std::{sync::Arc, time::Duration};
use axum::Router;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use scrapemd_crawler::{FetchOrchestrator, HeadlessBrowser, StaticCrawler};

use crate::{
    config::{Config, LogFormat},
    handlers::AppState,
    routes::create_router,
};

pub fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// The router with one request-tracing layer that logs each response.
pub fn build_app(config: &Config, state: AppState) -> Router {
    create_router(config, state).layer(TraceLayer::new_for_http().on_response(
        |response: &axum::response::Response, latency: Duration, _span: &tracing::Span, req: &axum::http::Request<axum::body::Body>| {
            tracing::info!(
                "response latency: {:?}, method: {}, path: {}, status: {}",
                latency,
                req.method(),
                req.uri().path(),
                response.status()
            );
        },
    ))
}

pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting scrapemd-web-api server with config: {:?}", config);

    let browser = Arc::new(HeadlessBrowser::launch(config.render_config()).await);

    let crawler = Arc::new(StaticCrawler::new(config.crawler_config())?);
    let orchestrator = FetchOrchestrator::new(browser.clone(), crawler, config.scrape_timeout());
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    let app = build_app(&config, state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| format!("Failed to bind to address {}: {}", bind_address, e))?;

    let server_url = config.server_url();
    info!("Server running on {}", server_url);
    info!("OpenAPI docs available at {}/openapi.json", server_url);

    info!("Configuration options:");
    info!("  HOST: Host to bind to (default: 0.0.0.0)");
    info!("  PORT: Port to bind to (default: 8080)");
    info!("  RUST_LOG or LOG_LEVEL: Log level (default: scrapemd_web_api=debug,scrapemd_crawler=debug,tower_http=debug)");
    info!("  LOG_FORMAT: Log format - 'json' or 'text' (default: json)");
    info!("  CORS_ORIGINS: Comma-separated CORS origins (default: *)");
    info!("  SCRAPER_DELAY_S: Minimum delay between requests to one host in seconds (default: 2)");
    info!("  SCRAPER_RANDOM_DELAY_MS: Maximum random jitter added to the delay in milliseconds (default: 1000)");
    info!("  SCRAPER_USER_AGENTS: Comma-separated user agents to rotate through (default: built-in list)");
    info!("  SCRAPER_REQUEST_TIMEOUT_S: Per-request HTTP timeout in seconds (default: 30)");
    info!("  SCRAPER_TIMEOUT_S: Overall scrape timeout in seconds (default: 30)");
    info!("  SCRAPER_IGNORE_ROBOTS: Skip robots.txt checks (default: false)");
    info!("  RENDER_TIMEOUT_S: Headless render timeout in seconds (default: 10)");
    info!("  RENDER_SETTLE_MS: Wait after page load before capture in milliseconds (default: 2000)");
    info!("  CHROME_EXECUTABLE: Path to the Chrome/Chromium binary (default: auto-detect)");
    info!("  CHROME_NO_SANDBOX: Launch Chrome with --no-sandbox (default: false)");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Shutting down scrapemd-web-api server");
    browser.shutdown().await;

    served?;
    Ok(())
}
