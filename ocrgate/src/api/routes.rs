use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::cors::cors_layer;
use super::{handlers, openapi, AppState};

pub fn create_router(state: AppState) -> Router {
    // Uploads are bounded while streaming against the configured ceiling,
    // so axum's fixed 2MB default must not cut them off first.
    let ocr: Router<AppState> = Router::new()
        .route("/ocr", post(handlers::extract_text))
        .route("/ocr-with-prompt", post(handlers::extract_text_with_prompt))
        .layer(DefaultBodyLimit::disable());

    let mut router: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .merge(ocr);

    if state.config.cors.enabled {
        tracing::info!("CORS middleware enabled");
        router = router.layer(cors_layer(&state.config.cors));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
