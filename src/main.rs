use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use content_language_settings::config::Config;
use content_language_settings::metadata::EntityRegistry;
use content_language_settings::store::SqliteConfigStore;
use content_language_settings::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_language_settings=info".parse()?),
        )
        .init();

    info!("Starting content language settings service");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Entity metadata: file-backed registry, or the built-in default set
    let registry = match &config.entity_registry_file {
        Some(path) => {
            info!("Loading entity registry from {}", path);
            EntityRegistry::from_file(path)?
        }
        None => EntityRegistry::default(),
    };

    // Open the settings store
    let store = SqliteConfigStore::open(&config.database_path)?;
    info!("Opened settings store at {}", config.database_path);

    let state = AppState {
        metadata: Arc::new(registry),
        store: Arc::new(store),
        assignable_langcodes: config.assignable_langcodes.clone(),
        admin_api_key: config.admin_api_key.clone(),
    };
    let app = web::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}{}", addr, web::SETTINGS_PATH);
    axum::serve(listener, app).await?;

    Ok(())
}
