use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::FavoriteRepo;
use crate::favorites;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn FavoriteRepo>,
}

impl AppState {
    pub fn new(db: Arc<dyn FavoriteRepo>) -> Self {
        Self { db }
    }
}

pub fn build_router(state: AppState) -> Router {
    // The first segment is a user for GET and a movie id for DELETE; the
    // router needs one name per position. Every path is also routed with a
    // trailing slash.
    let collection = || {
        post(favorites::add_favorite)
            .get(favorites::missing_user)
            .delete(favorites::missing_remove_params)
    };
    let single = || get(favorites::list_favorites).delete(favorites::missing_remove_params);
    let pair = || delete(favorites::remove_favorite);

    let favorite_routes = Router::<AppState>::new()
        .route("/api/favorites", collection())
        .route("/api/favorites/", collection())
        .route("/api/favorites/:id", single())
        .route("/api/favorites/:id/", single())
        .route("/api/favorites/:id/:user", pair())
        .route("/api/favorites/:id/:user/", pair());

    Router::new()
        .route("/robots.txt", get(robots_txt_handler))
        .merge(favorite_routes)
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn fallback_handler(req: Request<axum::body::Body>) -> impl IntoResponse {
    // CORS preflight for paths without a route.
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}
