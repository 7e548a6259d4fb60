mod api;
mod middleware;
mod service;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use wayward_core::{Attraction, Environment};
use wayward_gps::{GpsHttpClient, GpsSimulator, LocationProvider};
use wayward_pricing::{RewardCentral, RewardPointsProvider, TripPricer};
use wayward_tracking::{seed_internal_users, RewardEngine, Tracker, TrackerConfig, UserStore};

use crate::api::{build_app, AppState};
use crate::service::GuideService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wayward_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let gps: Arc<dyn LocationProvider> = match config.gps_base_url.as_deref() {
        Some(base_url) => {
            tracing::info!(base_url, "using remote GPS service");
            Arc::new(GpsHttpClient::new(
                base_url,
                config.gps_request_timeout_secs,
                config.gps_max_retries,
                config.gps_retry_backoff_base_ms,
            )?)
        }
        None => {
            tracing::info!("WAYWARD_GPS_BASE_URL not set; using the in-process GPS simulator");
            Arc::new(GpsSimulator::new())
        }
    };

    let catalog: Arc<[Attraction]> = gps.attractions().await?.into();
    if catalog.is_empty() {
        tracing::warn!("attraction catalog is empty; reward passes will be no-ops");
    } else {
        tracing::info!(attractions = catalog.len(), "attraction catalog loaded");
    }

    let store = Arc::new(UserStore::new());
    if config.env != Environment::Production && config.internal_user_count > 0 {
        seed_internal_users(&store, config.internal_user_count).await;
    }

    let points: Arc<dyn RewardPointsProvider> = Arc::new(RewardCentral::new());
    let engine = Arc::new(RewardEngine::new(
        Arc::clone(&points),
        config.rewards_max_concurrent,
    ));
    engine.set_proximity_buffer(config.proximity_buffer_miles);

    let tracker = Arc::new(Tracker::new(
        Arc::clone(&store),
        Arc::clone(&gps),
        engine,
        Arc::clone(&catalog),
        TrackerConfig {
            interval: Duration::from_secs(config.tracking_interval_secs),
            max_concurrent_users: config.tracker_max_concurrent_users,
        },
    ));
    tracker.start().await;

    let service = Arc::new(GuideService::new(
        store,
        Arc::clone(&tracker),
        points,
        TripPricer::new(),
        catalog,
        config.trip_pricer_api_key.clone(),
    ));
    let app = build_app(AppState { service });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "wayward server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracker.stop_tracking().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
