use crate::error::Result;
use crate::handlers::{auth, cart, listings};
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{delete, get, post},
    Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

/// Create the HTTP router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    let mut router = Router::new()
        .route("/health", get(listings::health))
        // Catalog
        .route("/api/categories", get(listings::list_categories))
        .route("/api/listings", get(listings::list_listings))
        .route("/api/listings/:id", get(listings::get_listing))
        .route("/api/listings/:id/share", get(listings::share_listing))
        .route("/api/seasonal-guide", get(listings::seasonal_guide))
        // Provider-delegated sign-in
        .route("/api/auth/providers", get(auth::providers))
        .route("/api/auth/signin/:provider", get(auth::signin))
        .route("/api/auth/callback/:provider", get(auth::callback))
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/error", get(auth::auth_error))
        // Mock cart
        .route("/api/cart/:cart_id", get(cart::get_cart))
        .route("/api/cart/:cart_id/items", post(cart::add_item))
        .route("/api/cart/:cart_id/items/:listing_id", delete(cart::remove_item))
        .route("/api/cart/:cart_id/checkout", post(cart::checkout));

    if let Some(dir) = &state.config.server.static_dir {
        router = router.nest_service("/assets", ServeDir::new(dir));
    }

    router
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Start the HTTP server on the configured port and run until Ctrl+C / SIGTERM.
pub async fn start_server(state: Arc<AppState>) -> Result<()> {
    let port = state.config.server.port;
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");
    info!("Listings:     http://localhost:{port}/api/listings");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
