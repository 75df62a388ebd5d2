//! Browser-based to-do list manager.
//!
//! Visitors register or sign in (local credentials or Google OAuth), then
//! create, view and delete items within named lists. Every route is a
//! single page render or redirect backed by one or two MongoDB operations;
//! list seeding and federated find-or-create are atomic upserts.

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod state;
pub mod store;
pub mod views;

use config::Config;
use state::{AppData, AppState};
use store::Store;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/about", get(routes::about))
        .route("/login", get(routes::login_page).post(routes::login))
        .route("/register", get(routes::register_page).post(routes::register))
        .route("/logout", get(routes::logout))
        .route("/auth/google", get(routes::google_auth))
        .route("/auth/google/callback", get(routes::google_callback))
        .route("/list", get(routes::default_list).post(routes::add_item))
        .route("/delete", post(routes::delete_item))
        .route("/:name", get(routes::named_list))
        .nest_service("/static", ServeDir::new("static"))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}

pub async fn start_server() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::load();

    log::info!("connecting to {}", config.mongodb_url);
    let store = Store::connect(&config.mongodb_url, &config.mongodb_db).await?;

    if config.google.is_none() {
        log::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, google sign-in disabled");
    }

    let state = AppData::new(store, &config)?;
    let app = app(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    log::info!("server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        log::info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
