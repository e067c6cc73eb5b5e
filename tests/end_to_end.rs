use std::sync::Arc;

use async_trait::async_trait;
use cinezone::catalog::{CatalogApi, CatalogError, Movie};
use cinezone::db::{MovieId, NewFavorite, SqliteRepository};
use cinezone::favorites::{AddOutcome, ClientError, FavoritesApi, FavoritesClient, RemoveOutcome};
use cinezone::server::{build_router, AppState};
use cinezone::view::{MovieDetailView, Session, ViewState};

async fn spawn_server() -> String {
    let db = Arc::new(SqliteRepository::in_memory().await.unwrap());
    let app = build_router(AppState::new(db));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_client_against_server() {
    let base_url = spawn_server().await;
    let client = FavoritesClient::new(&base_url);

    let favorite = NewFavorite {
        movie_id: MovieId::from(42),
        title: Some("The Hitchhiker's Guide to the Galaxy".to_string()),
        poster: None,
        rating: Some(6.7),
        liked_by: "guest".to_string(),
    };

    let outcome = client.add(&favorite).await.unwrap();
    let AddOutcome::Added(record) = outcome else {
        panic!("expected a new record, got {:?}", outcome);
    };
    assert_eq!(record.movie_id, MovieId::from(42));
    assert_eq!(client.add(&favorite).await.unwrap(), AddOutcome::AlreadyExists);

    let list = client.list("guest").await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].movie_id.as_str(), "42");

    assert_eq!(
        client.remove(&MovieId::from(42), "guest").await.unwrap(),
        RemoveOutcome::Removed
    );
    assert_eq!(
        client.remove(&MovieId::from(42), "guest").await.unwrap(),
        RemoveOutcome::NotFound
    );
    assert!(client.list("guest").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_remove_via_wrong_base_url_is_an_error() {
    let base_url = spawn_server().await;
    let client = FavoritesClient::new(&format!("{}/backend", base_url));

    let result = client.remove(&MovieId::from(42), "guest").await;
    assert!(matches!(result, Err(ClientError::Status(404, _))));
}

struct OneMovie(Movie);

#[async_trait]
impl CatalogApi for OneMovie {
    async fn get_movie(&self, id: &MovieId) -> Result<Movie, CatalogError> {
        if *id == MovieId::from(self.0.id) {
            return Ok(self.0.clone());
        }
        Err(CatalogError::NotFound(id.to_string()))
    }
}

#[tokio::test]
async fn test_view_toggles_through_service() {
    let base_url = spawn_server().await;
    let api = Arc::new(FavoritesClient::new(&base_url));
    let movie: Movie = serde_json::from_str(
        r#"{"id": 603, "title": "The Matrix", "poster_path": "/matrix.jpg", "vote_average": 8.2}"#,
    )
    .unwrap();
    let catalog = Arc::new(OneMovie(movie));
    let session = Session::new("me@example.com");

    let mut view = MovieDetailView::new(
        session.clone(),
        MovieId::from(603),
        None,
        catalog.clone(),
        api.clone(),
    );
    view.mount().await;
    assert!(matches!(view.state(), ViewState::Ready(_)));
    assert!(!view.is_liked());

    assert!(view.toggle_favorite().await);
    let stored = api.list(session.user()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].poster.as_deref(), Some("/matrix.jpg"));

    // A fresh view sees the persisted favorite.
    let mut again = MovieDetailView::new(session, MovieId::from(603), None, catalog, api.clone());
    again.mount().await;
    assert!(again.is_liked());
    assert!(!again.toggle_favorite().await);
    assert!(api.list("me@example.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_view_rolls_back_when_service_is_down() {
    // Nothing listens on this port once the listener is dropped.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let movie: Movie = serde_json::from_str(r#"{"id": 603, "title": "The Matrix"}"#).unwrap();
    let mut view = MovieDetailView::new(
        Session::default(),
        MovieId::from(603),
        Some(movie),
        Arc::new(OneMovie(serde_json::from_str(r#"{"id": 1}"#).unwrap())),
        Arc::new(FavoritesClient::new(&base_url)),
    );
    view.mount().await;
    assert!(view.favorites().is_empty());

    let pending = view.begin_toggle().unwrap();
    assert!(view.is_liked());
    let result = pending.send(view.favorites_api().as_ref()).await;
    assert!(result.is_err());
    view.finish_toggle(pending, result);
    assert!(!view.is_liked());
}
