use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait FavoriteRepo: Send + Sync {
    async fn find_favorite(&self, movie_id: &MovieId, user: &str) -> DbResult<Option<FavoriteRecord>>;
    /// Fails with `DbError::AlreadyExists` if the (movie, user) pair is taken.
    async fn insert_favorite(&self, favorite: &NewFavorite) -> DbResult<FavoriteRecord>;
    async fn list_favorites(&self, user: &str) -> DbResult<Vec<FavoriteRecord>>;
    /// Returns the deleted record, or `None` if nothing matched.
    async fn delete_favorite(&self, movie_id: &MovieId, user: &str) -> DbResult<Option<FavoriteRecord>>;
}
