use gatehouse::api::{start_api_server, AppState};
use gatehouse::observability::{init_tracing, log_config_info};
use gatehouse::storage::create_pool;
use gatehouse::{AppConfig, Result};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the config reads the environment
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.observability)?;
    log_config_info(&config);

    let pool = create_pool(&config.database).await?;
    let state = AppState::new(&config, pool);

    info!(
        app_name = gatehouse::APP_NAME,
        version = gatehouse::VERSION,
        "Starting Gatehouse authentication service"
    );

    start_api_server(&config.server, state).await
}
