// Main entry point for the ingestion server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::{build_app, start_scheduler, AppState, Config, FetcherRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ingest::{ApiFetcher, BridgeFetcher, IngestStore, JobSource, SourceFetcher};

/// Routes scheduled imports to the configured fetchers.
struct ConfiguredFetchers {
    api: Arc<dyn SourceFetcher>,
    bridge: Option<Arc<dyn SourceFetcher>>,
}

impl FetcherRegistry for ConfiguredFetchers {
    fn fetcher_for(&self, source: JobSource) -> Option<Arc<dyn SourceFetcher>> {
        match source {
            JobSource::Api => Some(self.api.clone()),
            JobSource::Scraped => self.bridge.clone(),
            _ => None,
        }
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn IngestStore>> {
    #[cfg(feature = "postgres")]
    if let Some(url) = &config.database_url {
        let store = ingest::PostgresStore::new(url)
            .await
            .context("Failed to connect to database")?;
        tracing::info!("Using PostgreSQL store");
        return Ok(Arc::new(store));
    }

    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL set but postgres feature disabled, using memory store");
    } else {
        tracing::info!("Using in-memory store");
    }
    Ok(Arc::new(ingest::MemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ingest=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Hirely ingestion server");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Select storage backend
    let store = build_store(&config).await?;

    // Source fetchers
    let api_fetcher: Arc<dyn SourceFetcher> = Arc::new(ApiFetcher::new(
        config.jobs_api_url.clone(),
        config.jobs_api_token.clone(),
    ));
    let bridge_fetcher: Option<Arc<dyn SourceFetcher>> = config
        .scraper_command
        .as_deref()
        .map(|cmd| Arc::new(BridgeFetcher::new(cmd)) as Arc<dyn SourceFetcher>);

    // Start scheduled imports
    let fetchers = Arc::new(ConfiguredFetchers {
        api: api_fetcher.clone(),
        bridge: bridge_fetcher,
    });
    let _scheduler = start_scheduler(&config.import_cron, store.clone(), fetchers)
        .await
        .context("Failed to start scheduler")?;

    // Build application
    let mut state = AppState::new(store, api_fetcher);
    if let Some(recipient) = config.admin_recipient {
        state = state.with_admin_recipient(recipient);
    }
    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
