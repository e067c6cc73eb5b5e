use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::db::{FavoriteRecord, MovieId, NewFavorite};

pub const MSG_ADDED: &str = "Added to favorites";
pub const MSG_ALREADY_ADDED: &str = "Already in favorites";
pub const MSG_REMOVED: &str = "Removed from favorites";
pub const MSG_NOT_FOUND: &str = "Favorite not found";

/// Body of `POST /api/favorites`. Every field is optional at the wire level
/// so that missing required fields surface as a 400 with our own message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    #[serde(default)]
    pub movie_id: Option<MovieId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub liked_by: Option<String>,
}

/// Ratings arrive as numbers or numeric strings ("8.2"); blank strings count
/// as absent.
fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid rating: {}", s))),
    }
}

impl AddFavoriteRequest {
    pub fn validate(self) -> Option<NewFavorite> {
        let movie_id = self.movie_id.filter(|id| !id.is_empty())?;
        let liked_by = self.liked_by.filter(|u| !u.trim().is_empty())?;
        Some(NewFavorite {
            movie_id,
            title: self.title,
            poster: self.poster,
            rating: self.rating,
            liked_by,
        })
    }
}

impl From<NewFavorite> for AddFavoriteRequest {
    fn from(favorite: NewFavorite) -> Self {
        Self {
            movie_id: Some(favorite.movie_id),
            title: favorite.title,
            poster: favorite.poster,
            rating: favorite.rating,
            liked_by: Some(favorite.liked_by),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedResponse {
    pub message: String,
    pub favorite: FavoriteRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure outcomes of the favorites endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(&'static str),
    NotFound(&'static str),
    /// Store failures. The message is generic; details only go to the log.
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(MessageResponse::new(message))).into_response()
            }
            ApiError::Internal(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_movie_and_user() {
        let req: AddFavoriteRequest =
            serde_json::from_str(r#"{"movieId": 42, "title": "Answer"}"#).unwrap();
        assert!(req.validate().is_none());

        let req: AddFavoriteRequest =
            serde_json::from_str(r#"{"movieId": "", "likedBy": "guest"}"#).unwrap();
        assert!(req.validate().is_none());

        let req: AddFavoriteRequest = serde_json::from_str(
            r#"{"movieId": 42, "poster": null, "rating": 7.5, "likedBy": "guest"}"#,
        )
        .unwrap();
        let favorite = req.validate().unwrap();
        assert_eq!(favorite.movie_id.as_str(), "42");
        assert_eq!(favorite.poster, None);
        assert_eq!(favorite.rating, Some(7.5));
        assert_eq!(favorite.liked_by, "guest");
    }

    #[test]
    fn test_rating_as_string() {
        let req: AddFavoriteRequest =
            serde_json::from_str(r#"{"movieId": 42, "rating": "8.2", "likedBy": "guest"}"#).unwrap();
        assert_eq!(req.rating, Some(8.2));

        let req: AddFavoriteRequest =
            serde_json::from_str(r#"{"movieId": 42, "rating": "", "likedBy": "guest"}"#).unwrap();
        assert_eq!(req.rating, None);

        let req: AddFavoriteRequest =
            serde_json::from_str(r#"{"movieId": 42, "rating": 7, "likedBy": "guest"}"#).unwrap();
        assert_eq!(req.rating, Some(7.0));

        assert!(serde_json::from_str::<AddFavoriteRequest>(
            r#"{"movieId": 42, "rating": "great", "likedBy": "guest"}"#
        )
        .is_err());
    }
}
