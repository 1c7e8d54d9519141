use crate::app_config::AppConfig;
use crate::store::LocationStore;
use axum::Router;
use axum::http::{Method, StatusCode};
use axum::http::header::CONTENT_TYPE;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

mod api_error;
mod list_locations;
mod pages;
mod save_location;

use list_locations::{admin_locations, list_locations};
use pages::Pages;
use save_location::save_location;

const ADMIN_LOCATIONS_PATH: &str = "/admin/locations";

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    store: Arc<dyn LocationStore>,
    pages: Arc<Pages>,
}

pub fn router(config: Arc<AppConfig>, store: Arc<dyn LocationStore>) -> Router {
    let prefix = config.routes().api_prefix().to_string();
    let save_path = format!("{prefix}/save-location");
    let list_path = format!("{prefix}/locations");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let mut router = Router::new()
        .route("/", get(pages::home))
        .route("/client1", get(pages::share))
        .route("/client2", get(pages::dashboard))
        .route(&save_path, post(save_location))
        .route(&list_path, get(list_locations));

    if config.routes().admin_listing() {
        if list_path == ADMIN_LOCATIONS_PATH {
            warn!("⚠️ Admin listing shadowed by the API prefix '{}', not mounted", prefix);
        } else {
            router = router.route(ADMIN_LOCATIONS_PATH, get(admin_locations));
        }
    }

    let request_timeout = config.server().request_timeout();
    let state = AppState {
        pages: Arc::new(Pages::render(&prefix)),
        config,
        store,
    };

    router
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
