use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use lumen_api::routes;
use lumen_api::state::AppStateInner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumen=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("LUMEN_DB_PATH").unwrap_or_else(|_| "lumen.db".into());
    let host = std::env::var("LUMEN_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LUMEN_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;

    // Init database — failure here aborts startup
    let db = lumen_db::Database::open(&PathBuf::from(&db_path))?;

    let state = Arc::new(AppStateInner { db });

    // Any origin with credentials allowed. A literal wildcard cannot be
    // combined with credentials, so origin/methods/headers mirror the
    // request instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let app = routes::app(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Lumen server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
