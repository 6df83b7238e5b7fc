use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use skylane_api::{app, state::AppState};
use skylane_core::clock::{Clock, SystemClock};
use skylane_core::repository::{
    BookingRepository, FlightInstanceRepository, RouteTemplateRepository, UserRepository,
};
use skylane_sim::{DaySync, LifecycleEngine, SettlementEngine};
use skylane_store::{
    DbClient, PostgresBookingRepository, PostgresFlightInstanceRepository,
    PostgresRouteTemplateRepository, PostgresUserRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skylane_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Skylane API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let templates: Arc<dyn RouteTemplateRepository> = Arc::new(PostgresRouteTemplateRepository {
        pool: db.pool.clone(),
    });
    let instances: Arc<dyn FlightInstanceRepository> = Arc::new(PostgresFlightInstanceRepository {
        pool: db.pool.clone(),
    });
    let bookings: Arc<dyn BookingRepository> = Arc::new(PostgresBookingRepository {
        pool: db.pool.clone(),
    });
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository {
        pool: db.pool.clone(),
    });
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let lifecycle = Arc::new(LifecycleEngine::new(
        templates.clone(),
        instances.clone(),
        clock.clone(),
        config.simulation.clone(),
    ));
    let day_sync = Arc::new(DaySync::new(Duration::from_secs(
        config.simulation.today_sync_min_interval_secs,
    )));
    let settlement = Arc::new(SettlementEngine::new(
        bookings,
        users,
        templates.clone(),
        clock.clone(),
        config.settlement.clone(),
    ));

    if config.settlement.worker_interval_secs > 0 {
        tokio::spawn(skylane_api::worker::start_settlement_worker(
            settlement.clone(),
            config.settlement.worker_interval_secs,
        ));
    }

    let app_state = AppState {
        templates,
        instances,
        lifecycle,
        day_sync,
        settlement,
        clock,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
