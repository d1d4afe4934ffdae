//! LifeOS canon service binary.
//!
//! Serves the flat-file world canon over HTTP: CRUD routes per entity,
//! version snapshot management, and the scenario chat proxy. Configuration
//! comes from the environment (`LIFEOS_DATA_DIR`, `LIFEOS_ADDR`,
//! `ANTHROPIC_API_KEY`); a missing API key disables the scenario routes
//! but leaves the rest of the service up.

use lifeos::config::ServerConfig;
use lifeos::routes;
use lifeos::state::AppState;
use lifeos_core::{ScenarioEngine, WorldStore};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let world = WorldStore::new(&config.data_dir);
    world.ensure_initialized().await?;

    let engine = match ScenarioEngine::from_env() {
        Ok(engine) => Some(engine),
        Err(_) => {
            warn!("ANTHROPIC_API_KEY not set; scenario generation routes are disabled");
            None
        }
    };

    let state = AppState::new(&config.data_dir, engine);
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(addr = %config.addr, data_dir = %config.data_dir.display(), "lifeos canon service listening");
    axum::serve(listener, app).await?;
    Ok(())
}
