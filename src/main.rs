use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use roast_relay::{
    app_state::AppState,
    config::AppConfig,
    db::{self, PgJobStore},
    routes,
    services::{
        generation::HttpGenerationClient,
        notifier::{HttpPushNotifier, LogNotifier, Notifier},
        relay::RelayService,
        signature::HmacVerifier,
        store::{JobStore, MemoryJobStore},
    },
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing roast-relay server");

    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    routes::metrics::describe_metrics();

    let store: Arc<dyn JobStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to PostgreSQL database");
            let pool = db::init_pool(database_url, &config.pool_settings())
                .await
                .expect("Failed to connect to database");

            tracing::info!("Running database migrations");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");

            Arc::new(PgJobStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, jobs are kept in memory only");
            Arc::new(MemoryJobStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.push_gateway_url {
        Some(url) => {
            tracing::info!(push_gateway = %url, "Push notifications enabled");
            Arc::new(HttpPushNotifier::new(url))
        }
        None => {
            tracing::info!("PUSH_GATEWAY_URL not set, notifications are logged only");
            Arc::new(LogNotifier)
        }
    };

    let generation = Arc::new(HttpGenerationClient::new(&config.generation_service_url));

    let relay = RelayService::new(config.relay_config(), generation, store, notifier);
    let state = AppState::new(relay, HmacVerifier::new(&config.webhook_secret));

    let app = routes::build_router(state, config.body_limit_bytes)
        .merge(routes::metrics::router(Arc::new(prometheus_handle)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(
        addr = %config.bind_addr,
        ai_service = %config.generation_service_url,
        "Server listening"
    );

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
