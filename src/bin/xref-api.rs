/// xref-api - HTTP front end for SCP key generation
///
/// Accepts cross reference uploads, lists their engines and serves previews
/// and CSV exports for an engine selection.

use std::net::SocketAddr;
use std::process;

use tracing_subscriber::EnvFilter;
use xrefkey::api::{router, AppState};
use xrefkey::XrefConfig;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match XrefConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let app = router(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            process::exit(1);
        }
    };

    tracing::info!("xref-api listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        process::exit(1);
    }
}
