use async_trait::async_trait;
use reqwest::StatusCode;

use super::types::*;
use crate::config::Config;
use crate::db::{FavoriteRecord, MovieId, NewFavorite};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service returned {0}: {1}")]
    Status(u16, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(FavoriteRecord),
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// The three favorites operations as seen from a client.
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn list(&self, user: &str) -> Result<Vec<FavoriteRecord>, ClientError>;
    async fn add(&self, favorite: &NewFavorite) -> Result<AddOutcome, ClientError>;
    async fn remove(&self, movie_id: &MovieId, user: &str) -> Result<RemoveOutcome, ClientError>;
}

/// HTTP client for the `/api/favorites` endpoints.
pub struct FavoritesClient {
    http: reqwest::Client,
    base_url: String,
}

impl FavoritesClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.backend_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/api/favorites", self.base_url);
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }
}

async fn status_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
    };
    ClientError::Status(status.as_u16(), message)
}

#[async_trait]
impl FavoritesApi for FavoritesClient {
    async fn list(&self, user: &str) -> Result<Vec<FavoriteRecord>, ClientError> {
        let response = self.http.get(self.url(&[user])).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn add(&self, favorite: &NewFavorite) -> Result<AddOutcome, ClientError> {
        let body = AddFavoriteRequest::from(favorite.clone());
        let response = self.http.post(self.url(&[])).json(&body).send().await?;
        match response.status() {
            StatusCode::CREATED => {
                let added: AddedResponse = response.json().await?;
                Ok(AddOutcome::Added(added.favorite))
            }
            StatusCode::OK => Ok(AddOutcome::AlreadyExists),
            _ => Err(status_error(response).await),
        }
    }

    async fn remove(&self, movie_id: &MovieId, user: &str) -> Result<RemoveOutcome, ClientError> {
        let response = self
            .http
            .delete(self.url(&[movie_id.as_str(), user]))
            .send()
            .await?;
        match response.status() {
            s if s.is_success() => Ok(RemoveOutcome::Removed),
            StatusCode::NOT_FOUND => {
                // A bare 404 means the route is wrong, not that the record is gone.
                match response.json::<MessageResponse>().await {
                    Ok(body) if body.message == MSG_NOT_FOUND => Ok(RemoveOutcome::NotFound),
                    _ => Err(ClientError::Status(404, "Not Found".to_string())),
                }
            }
            _ => Err(status_error(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let client = FavoritesClient::from_config(&Config::default());
        assert_eq!(client.url(&["guest"]), "http://localhost:5000/api/favorites/guest");
    }

    #[test]
    fn test_urls() {
        let client = FavoritesClient::new("http://localhost:5000/");
        assert_eq!(client.url(&[]), "http://localhost:5000/api/favorites");
        assert_eq!(
            client.url(&["42", "me@example.com"]),
            "http://localhost:5000/api/favorites/42/me%40example.com"
        );
    }
}
