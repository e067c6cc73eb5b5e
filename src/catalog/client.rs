use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::types::*;
use crate::config::CatalogConfig;
use crate::db::MovieId;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Movie not found: {0}")]
    NotFound(String),
    #[error("Catalog returned {0}: {1}")]
    Status(u16, String),
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_movie(&self, id: &MovieId) -> Result<Movie, CatalogError>;
}

/// Client for a TMDB-compatible movie catalog, keyed by an API token.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    language: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &CatalogConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    fn movie_url(&self, id: &MovieId) -> String {
        format!("{}/movie/{}", self.base_url, urlencoding::encode(id.as_str()))
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn get_movie(&self, id: &MovieId) -> Result<Movie, CatalogError> {
        let url = self.movie_url(id);
        debug!("Fetching movie {} from catalog", id);

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(response.json::<Movie>().await?),
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(id.to_string())),
            s => {
                let message = response
                    .json::<CatalogStatus>()
                    .await
                    .ok()
                    .and_then(|b| b.status_message)
                    .unwrap_or_else(|| s.canonical_reason().unwrap_or_default().to_string());
                Err(CatalogError::Status(s.as_u16(), message))
            }
        }
    }
}
