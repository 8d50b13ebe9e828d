use axum::extract::DefaultBodyLimit;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sena_admin::config::Config;
use sena_admin::store::PgBackend;
use sena_admin::{db, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "sena_admin=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;

    let state = AppState::new(PgBackend::new(pool), config.advisory_policy);
    let app = router(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(policy = ?config.advisory_policy, "listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
