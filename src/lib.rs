pub mod api;
pub mod catalog;
pub mod config;
pub mod core_state;
pub mod intake;
pub mod models;
pub mod places;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::intake::{AnalysisInvoker, AnalysisProvider, BedrockClient};
use crate::places::{GooglePlacesClient, PlacesLookup};

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = AppConfig::from_env();
    let status = app_config.provider.diagnose();
    tracing::info!(
        region = %status.region,
        region_valid = status.region_valid,
        has_access_key = status.has_access_key,
        has_secret_key = status.has_secret_key,
        has_session_token = status.has_session_token,
        model_id = %status.model_id,
        model_valid = status.model_valid,
        "Provider configuration"
    );
    if !status.is_ready() {
        tracing::warn!("Provider configuration incomplete; every analysis will use the fallback result");
    }

    let max_retries = app_config.provider.max_retries;
    let timeout_secs = app_config.provider.timeout_secs;
    let provider: Arc<dyn AnalysisProvider> = match BedrockClient::new(app_config.provider) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build provider client");
            return;
        }
    };
    let invoker = Arc::new(AnalysisInvoker::new(provider, max_retries));

    let places: Option<Arc<dyn PlacesLookup>> = match app_config.server.places_api_key.as_deref() {
        Some(key) => match GooglePlacesClient::new(key, timeout_secs) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Places lookup disabled");
                None
            }
        },
        None => {
            tracing::info!("GOOGLE_MAPS_API_KEY not set; places lookup disabled");
            None
        }
    };

    let core = Arc::new(CoreState::new(invoker, places));
    let bind_addr = app_config.server.bind_addr;

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            return;
        }
    };

    runtime.block_on(async move {
        let server = match api::start_api_server(core, bind_addr).await {
            Ok(server) => server,
            Err(e) => {
                tracing::error!("{e}");
                return;
            }
        };
        tracing::info!(addr = %server.info.server_addr, "Listening");

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        server.stop().await;
    });

    tracing::info!("{} stopped", config::APP_NAME);
}
