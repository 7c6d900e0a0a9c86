//! tinywiki - a minimal personal wiki
//!
//! Pages are markdown rendered to sanitized HTML and stored one file per
//! title. The crate is split into services (storage, rendering, search,
//! accounts, sessions), presentation components and axum handlers.

pub mod components;
pub mod config;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::{RequestBodyTimeoutLayer, ResponseBodyTimeoutLayer};

// Re-export commonly used items
pub use config::Config;
pub use errors::WikiError;
pub use types::{AppState, Page};
pub use services::{AccountService, MarkdownService, PageFinder, PageStore, SessionService};

/// Build the HTTP surface of the wiki.
pub fn build_router(state: AppState) -> Router {
    let read_timeout = state.config.read_timeout;
    let write_timeout = state.config.write_timeout;

    Router::new()
        .route("/", get(handlers::handle_root).post(handlers::handle_search))
        .route("/view/:title", get(handlers::handle_view))
        .route("/edit/:title", get(handlers::handle_edit))
        .route("/save/:title", post(handlers::handle_save))
        .route("/new", get(handlers::handle_new_form).post(handlers::handle_new))
        .route("/new/:title", get(handlers::handle_new_titled))
        .route("/random", get(handlers::handle_random))
        .route("/random/:seed", get(handlers::handle_random_seeded))
        .route("/login", get(handlers::handle_login_form).post(handlers::handle_login))
        .route("/login/:name", get(handlers::handle_login_form_named))
        .route("/logout", post(handlers::handle_logout))
        .route("/static/*path", get(handlers::handle_static))
        .fallback(handlers::handle_not_found)
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
        .layer(ResponseBodyTimeoutLayer::new(write_timeout))
        .with_state(state)
}

/// Create the data directories the wiki writes into.
pub fn prepare_storage(state: &AppState) -> Result<(), WikiError> {
    state.pages.ensure_dir()?;
    state.accounts.ensure_dir()?;
    Ok(())
}
