use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::session::Session;
use crate::catalog::{CatalogApi, CatalogError, Movie};
use crate::config::CatalogConfig;
use crate::db::{MovieId, NewFavorite};
use crate::favorites::{ClientError, FavoritesApi};

pub const LIKED_LABEL: &str = "❤️ Liked";
pub const LIKE_LABEL: &str = "🤍 Like";
pub const FETCH_FAILED: &str = "Failed to fetch movie details.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(Movie),
    Error(String),
    NotFound,
}

/// State behind the movie detail page: the movie being shown and the set of
/// movie ids the session user has liked.
pub struct MovieDetailView {
    session: Session,
    movie_id: MovieId,
    state: ViewState,
    favorites: HashSet<MovieId>,
    image_base_url: String,
    catalog: Arc<dyn CatalogApi>,
    api: Arc<dyn FavoritesApi>,
}

/// A favorite change that has already been applied locally and still has to
/// be sent to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToggle {
    movie_id: MovieId,
    request: ToggleRequest,
}

#[derive(Debug, Clone, PartialEq)]
enum ToggleRequest {
    Add(NewFavorite),
    Remove { user: String },
}

impl PendingToggle {
    pub fn movie_id(&self) -> &MovieId {
        &self.movie_id
    }

    pub fn is_add(&self) -> bool {
        matches!(self.request, ToggleRequest::Add(_))
    }

    /// Soft outcomes ("already in favorites", "not found") leave the service
    /// in the state the view already shows, so they count as success.
    pub async fn send(&self, api: &dyn FavoritesApi) -> Result<(), ClientError> {
        match &self.request {
            ToggleRequest::Add(favorite) => api.add(favorite).await.map(|_| ()),
            ToggleRequest::Remove { user } => api.remove(&self.movie_id, user).await.map(|_| ()),
        }
    }
}

impl MovieDetailView {
    /// `cached` is the movie handed over by the page that linked here, if any.
    pub fn new(
        session: Session,
        movie_id: MovieId,
        cached: Option<Movie>,
        catalog: Arc<dyn CatalogApi>,
        api: Arc<dyn FavoritesApi>,
    ) -> Self {
        let state = match cached {
            Some(movie) => ViewState::Ready(movie),
            None => ViewState::Loading,
        };
        Self {
            session,
            movie_id,
            state,
            favorites: HashSet::new(),
            image_base_url: CatalogConfig::default().image_base_url,
            catalog,
            api,
        }
    }

    /// Poster images are resolved against the catalog's image host.
    pub fn with_catalog_config(mut self, config: &CatalogConfig) -> Self {
        self.image_base_url = config.image_base_url.clone();
        self
    }

    pub async fn mount(&mut self) {
        self.load_favorites().await;
        if self.state == ViewState::Loading {
            self.load_movie().await;
        }
    }

    /// A failure here is not shown to the user; the page renders as if
    /// nothing was liked.
    pub async fn load_favorites(&mut self) {
        match self.api.list(self.session.user()).await {
            Ok(records) => {
                self.favorites = records.into_iter().map(|r| r.movie_id).collect();
            }
            Err(e) => warn!("Error fetching favorites for {}: {}", self.session.user(), e),
        }
    }

    pub async fn load_movie(&mut self) {
        self.state = match self.catalog.get_movie(&self.movie_id).await {
            Ok(movie) => ViewState::Ready(movie),
            Err(CatalogError::NotFound(id)) => {
                debug!("Movie {} not in catalog", id);
                ViewState::NotFound
            }
            Err(e) => {
                error!("Error fetching movie {}: {}", self.movie_id, e);
                ViewState::Error(FETCH_FAILED.to_string())
            }
        };
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn movie(&self) -> Option<&Movie> {
        match &self.state {
            ViewState::Ready(movie) => Some(movie),
            _ => None,
        }
    }

    pub fn poster_url(&self) -> Option<String> {
        self.movie().map(|m| m.poster_url(&self.image_base_url))
    }

    pub fn favorites(&self) -> &HashSet<MovieId> {
        &self.favorites
    }

    pub fn favorites_api(&self) -> Arc<dyn FavoritesApi> {
        Arc::clone(&self.api)
    }

    pub fn is_liked(&self) -> bool {
        self.movie()
            .map(|m| self.favorites.contains(&MovieId::from(m.id)))
            .unwrap_or(false)
    }

    pub fn like_label(&self) -> &'static str {
        if self.is_liked() {
            LIKED_LABEL
        } else {
            LIKE_LABEL
        }
    }

    /// Flips the shown movie's membership locally and returns the request
    /// that makes the service agree. `None` unless a movie is shown.
    pub fn begin_toggle(&mut self) -> Option<PendingToggle> {
        let movie = self.movie()?;
        let movie_id = MovieId::from(movie.id);
        let user = self.session.user().to_string();

        let request = if self.favorites.contains(&movie_id) {
            ToggleRequest::Remove { user }
        } else {
            ToggleRequest::Add(NewFavorite {
                movie_id: movie_id.clone(),
                title: Some(movie.title.clone()),
                poster: movie.poster_path.clone(),
                rating: Some(movie.vote_average),
                liked_by: user,
            })
        };

        match request {
            ToggleRequest::Add(_) => self.favorites.insert(movie_id.clone()),
            ToggleRequest::Remove { .. } => self.favorites.remove(&movie_id),
        };

        Some(PendingToggle { movie_id, request })
    }

    /// Restores the prior membership of the toggled movie if the request
    /// failed. Other movies in the set are left alone.
    pub fn finish_toggle(&mut self, pending: PendingToggle, result: Result<(), ClientError>) {
        let Err(e) = result else {
            return;
        };

        match pending.request {
            ToggleRequest::Add(_) => {
                warn!("Error adding favorite {}: {}", pending.movie_id, e);
                self.favorites.remove(&pending.movie_id);
            }
            ToggleRequest::Remove { .. } => {
                warn!("Error removing favorite {}: {}", pending.movie_id, e);
                self.favorites.insert(pending.movie_id);
            }
        }
    }

    /// Optimistic toggle: flip, send, roll back on failure. Returns whether
    /// the movie is liked afterwards.
    pub async fn toggle_favorite(&mut self) -> bool {
        if let Some(pending) = self.begin_toggle() {
            let api = self.favorites_api();
            let result = pending.send(api.as_ref()).await;
            self.finish_toggle(pending, result);
        }
        self.is_liked()
    }
}
