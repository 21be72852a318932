//! Referral-submission service.
//!
//! A public form collects a name, email, phone number, and a proof-of-
//! referral image. One endpoint validates the submission, stores the
//! image in an object-store bucket, and persists the referral row. At
//! most five referrals are accepted overall, at most one per email.
//!
//! The relational and storage backends are external managed services
//! reached through [`database::ReferralRepo`] and
//! [`storage::ObjectStore`]; the service itself keeps no mutable state
//! between requests.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod admission;
pub mod config;
pub mod database;
pub mod error;
pub mod page;
pub mod routes;
pub mod state;
pub mod storage;

use routes::{status_handler, submit_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    // No framework body cap: the admission workflow checks the image
    // size itself and reports the actual size in its rejection message.
    Router::new()
        .route("/", get(page::index_handler))
        .route("/api/referrals", post(submit_handler).get(status_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");
    let app = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
