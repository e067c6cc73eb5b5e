use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::types::*;
use crate::db::{DbError, FavoriteRecord, MovieId};
use crate::server::AppState;

const ERR_ADD_REQUIRED: &str = "movieId and likedBy are required";
const ERR_INVALID_BODY: &str = "Invalid favorite body";
const ERR_USER_REQUIRED: &str = "User parameter is required";
const ERR_REMOVE_REQUIRED: &str = "movieId and user are required";

/// POST /api/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    payload: Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|e| {
        debug!("Rejected favorite body: {}", e);
        ApiError::BadRequest(ERR_INVALID_BODY)
    })?;
    let favorite = req.validate().ok_or(ApiError::BadRequest(ERR_ADD_REQUIRED))?;

    let failed = |e: DbError| {
        error!("Error adding favorite: {}", e);
        ApiError::Internal("Failed to add favorite")
    };

    let existing = state
        .db
        .find_favorite(&favorite.movie_id, &favorite.liked_by)
        .await
        .map_err(failed)?;
    if existing.is_some() {
        return Ok(already_added());
    }

    match state.db.insert_favorite(&favorite).await {
        Ok(record) => {
            debug!(movie = %record.movie_id, user = %record.liked_by, "Favorite added");
            let body = AddedResponse {
                message: MSG_ADDED.to_string(),
                favorite: record,
            };
            Ok((StatusCode::CREATED, Json(body)).into_response())
        }
        // Lost a race against a concurrent add for the same pair.
        Err(DbError::AlreadyExists(_)) => Ok(already_added()),
        Err(e) => Err(failed(e)),
    }
}

fn already_added() -> Response {
    (StatusCode::OK, Json(MessageResponse::new(MSG_ALREADY_ADDED))).into_response()
}

/// GET /api/favorites/:user
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<FavoriteRecord>>, ApiError> {
    if user.trim().is_empty() {
        return Err(ApiError::BadRequest(ERR_USER_REQUIRED));
    }

    let favorites = state.db.list_favorites(&user).await.map_err(|e| {
        error!("Error fetching favorites: {}", e);
        ApiError::Internal("Failed to fetch favorites")
    })?;

    Ok(Json(favorites))
}

/// DELETE /api/favorites/:movie_id/:user
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((movie_id, user)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let movie_id = MovieId::new(movie_id);
    if movie_id.is_empty() || user.trim().is_empty() {
        return Err(ApiError::BadRequest(ERR_REMOVE_REQUIRED));
    }

    let removed = state
        .db
        .delete_favorite(&movie_id, &user)
        .await
        .map_err(|e| {
            error!("Error removing favorite: {}", e);
            ApiError::Internal("Failed to remove favorite")
        })?;

    match removed {
        Some(_) => {
            debug!(movie = %movie_id, user = %user, "Favorite removed");
            Ok(Json(MessageResponse::new(MSG_REMOVED)))
        }
        None => Err(ApiError::NotFound(MSG_NOT_FOUND)),
    }
}

/// GET /api/favorites without a user segment.
pub async fn missing_user() -> ApiError {
    ApiError::BadRequest(ERR_USER_REQUIRED)
}

/// DELETE /api/favorites/:movie_id without a user segment.
pub async fn missing_remove_params() -> ApiError {
    ApiError::BadRequest(ERR_REMOVE_REQUIRED)
}
