use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::store::UserStore;

/// Largest accepted request body; profile images travel inline.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router() -> Router {
    use axum::http::Method;
    use tower_http::cors::{Any, CorsLayer};

    let mut app = Router::new()
        .merge(crate::routes::user_routes::user_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // Configure CORS based on environment variables so a browser form on
    // another origin can post here.
    let cors_allowed = std::env::var("CORS_ALLOWED_ORIGINS").ok();
    let enable_cors = std::env::var("ENABLE_CORS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if enable_cors || cors_allowed.is_some() {
        let methods = [Method::GET, Method::POST, Method::OPTIONS];
        // "*" (or no list at all) means any origin; otherwise a CSV of origins.
        let cors_layer = match cors_allowed {
            Some(list) if list.trim() != "*" => {
                use axum::http::header::HeaderValue;
                use tower_http::cors::AllowOrigin;
                let origins = list
                    .split(',')
                    .filter_map(|s| HeaderValue::from_str(s.trim()).ok())
                    .collect::<Vec<HeaderValue>>();
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(methods)
                    .allow_headers(Any)
            }
            _ => CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(methods)
                .allow_headers(Any),
        };
        app = app.layer(cors_layer);
    }

    app.layer(TraceLayer::new_for_http())
}

pub fn create_app(store: Arc<UserStore>) -> Router {
    build_router().layer(Extension(store))
}
