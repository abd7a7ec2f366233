use axum::{Router, routing::get};

// Import user-related handlers
use crate::handlers::user_handler::{index, profile_image, store};

pub fn user_routes() -> Router {
    Router::new()
        .route("/api/users", get(index).post(store))
        .route("/api/users/{id}/profile_image", get(profile_image))
}
