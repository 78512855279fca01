use axum::{routing::get, Router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stagepass::{config::Config, controllers, AppState};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting StagePass API");

    let state = AppState::new(config)
        .await
        .expect("Failed to initialize application state");
    info!("Database connected, migrations applied");

    // Fill the events cache before taking traffic
    state.cache.warmup_cache().await;
    info!("Cache warmed up");

    // --- Start background tasks ---

    // Task to drop booked-seat mirrors for finished shows every 10 minutes
    let prune_state = state.clone();
    task::spawn(async move {
        loop {
            prune_state.cache.prune_finished_shows().await;
            tokio::time::sleep(Duration::from_secs(600)).await;
        }
    });

    // --- Start the web server ---

    // Create the main router
    let app = Router::new()
        .route("/", get(|| async { "StagePass API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .merge(controllers::routes())
        // Pass the application state to the router
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
