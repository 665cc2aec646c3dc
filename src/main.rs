use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use relief_map::database::draft_repo;
use relief_map::services::dashboard_service;
use relief_map::web::routes;
use relief_map::web::state::{AppState, Collaborators};

#[tokio::main]
async fn main() {
    // Load .env
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Database (drafts)
    let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://relief.db".to_string());
    info!("🗄️ Connecting to database: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)
        .expect("DATABASE_URL is not a valid SQLite url")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Cannot connect to the database");
    draft_repo::ensure_schema(&pool)
        .await
        .expect("Cannot create the draft table");

    // 3. Shared state and background work
    let state = AppState::new(pool, Collaborators::from_env());
    dashboard_service::spawn_stats_ticker(state.stats.clone(), state.proximity.clone());
    let tracker = state.tracker.clone();

    // 4. Router
    let app = routes::router(state);

    // 5. Start the server (with fallback port)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(
                "⚠️  Could not bind {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind the fallback port")
        }
    };

    let bound_addr = listener.local_addr().expect("Listener has no local address");
    info!("🚀 Server running on http://{}", bound_addr);
    info!("📍 Nearby stream at http://{}/api/nearby/stream", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("🛑 Shutting down");
        })
        .await
        .expect("Server error");

    tracker.stop().await;
}
