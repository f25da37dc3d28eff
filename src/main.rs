// study planner api

use shuttle_axum::ShuttleAxum;
use shuttle_runtime::SecretStore;
use tracing::info;

mod config;
mod error;
mod handlers;
mod models;
mod planner;
mod store;
mod summary;

use config::{configure_secrets, report_configuration, AppConfig};
use handlers::{build_router, AppState};

// shuttle entry point
#[shuttle_runtime::main]
async fn axum(#[shuttle_runtime::Secrets] secret_store: SecretStore) -> ShuttleAxum {
    info!("Starting Study Planner API v1.0");

    configure_secrets(&secret_store);
    let config = AppConfig::from_env();
    report_configuration(&config);

    let router = build_router(AppState::new(config));
    Ok(router.into())
}
