use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use super::model::*;
use super::repo::*;

type FavoriteRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<f64>,
    String,
    String,
);

const FAVORITE_COLUMNS: &str = "id, movieid, title, poster, rating, likedby, created";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(db_path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    /// A private in-memory database. Every pool connection would get its own
    /// empty database, so the pool is pinned to a single connection that
    /// never expires.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;
        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::raw_sql(schema).execute(&self.pool).await?;
        Ok(())
    }
}

fn favorite_from_row(r: FavoriteRow) -> FavoriteRecord {
    FavoriteRecord {
        id: r.0,
        movie_id: MovieId::new(r.1),
        title: r.2,
        poster: r.3,
        rating: r.4,
        liked_by: r.5,
        created_at: DateTime::parse_from_rfc3339(&r.6)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
    }
}

#[async_trait]
impl FavoriteRepo for SqliteRepository {
    async fn find_favorite(&self, movie_id: &MovieId, user: &str) -> DbResult<Option<FavoriteRecord>> {
        let result = sqlx::query_as::<_, FavoriteRow>(&format!(
            "SELECT {} FROM favorites WHERE movieid = ? AND likedby = ?",
            FAVORITE_COLUMNS
        ))
        .bind(movie_id.as_str())
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.map(favorite_from_row))
    }

    async fn insert_favorite(&self, favorite: &NewFavorite) -> DbResult<FavoriteRecord> {
        let record = FavoriteRecord {
            id: uuid::Uuid::new_v4().to_string(),
            movie_id: favorite.movie_id.clone(),
            title: favorite.title.clone(),
            poster: favorite.poster.clone(),
            rating: favorite.rating,
            liked_by: favorite.liked_by.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO favorites
            (id, movieid, title, poster, rating, likedby, created)
            VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(record.movie_id.as_str())
        .bind(&record.title)
        .bind(&record.poster)
        .bind(record.rating)
        .bind(&record.liked_by)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => DbError::AlreadyExists(
                format!("Favorite {}/{}", record.movie_id, record.liked_by),
            ),
            _ => DbError::Sqlx(e),
        })?;

        Ok(record)
    }

    async fn list_favorites(&self, user: &str) -> DbResult<Vec<FavoriteRecord>> {
        let results = sqlx::query_as::<_, FavoriteRow>(&format!(
            "SELECT {} FROM favorites WHERE likedby = ? ORDER BY rowid",
            FAVORITE_COLUMNS
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(results.into_iter().map(favorite_from_row).collect())
    }

    async fn delete_favorite(&self, movie_id: &MovieId, user: &str) -> DbResult<Option<FavoriteRecord>> {
        let result = sqlx::query_as::<_, FavoriteRow>(&format!(
            "DELETE FROM favorites WHERE movieid = ? AND likedby = ? RETURNING {}",
            FAVORITE_COLUMNS
        ))
        .bind(movie_id.as_str())
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.map(favorite_from_row))
    }
}
