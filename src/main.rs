//! OSHA Monitor: binary entrypoint
//! Boots the Axum HTTP server: loads config, builds the source set, wires routes.

use osha_monitor::api::{self, AppState};
use osha_monitor::ingest::config::load_config_default;
use osha_monitor::metrics::Metrics;
use osha_monitor::Monitor;
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    osha_monitor::init_tracing();

    let cfg = load_config_default()?;
    let monitor = Monitor::from_config(&cfg)?;
    tracing::info!(sources = ?monitor.aggregator().source_names(), "monitor ready");

    let mut router = api::router(AppState::new(monitor));
    match Metrics::init(cfg.cache.ttl_secs) {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "metrics disabled"),
    }

    Ok(router.into())
}
