use axum::serve;
use tokio::net::TcpListener;

use tinywiki::logger::Logger;
use tinywiki::{build_router, prepare_storage, AppState, Config, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = Config::from_env();
    let addr = config.socket_addr();
    log::debug!("Configuration: {:?}", config);

    let state = AppState::new(config);
    prepare_storage(&state)?;
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        log::error!("Failed to bind {}: {}", addr, e);
        WikiError::from(e)
    })?;
    log::info!("Wiki listening on http://{}", addr);
    serve(listener, app).await.map_err(WikiError::from)
}
