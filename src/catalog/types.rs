use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/250x350?text=No+Image";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Movie details as returned by the catalog's `movie/{id}` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl Movie {
    pub fn poster_url(&self, image_base_url: &str) -> String {
        match self.poster_path.as_deref() {
            Some(path) if !path.is_empty() => format!("{}{}", image_base_url, path),
            _ => PLACEHOLDER_POSTER.to_string(),
        }
    }

    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn language(&self) -> String {
        self.original_language
            .as_deref()
            .unwrap_or_default()
            .to_uppercase()
    }
}

/// Error body the catalog returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogStatus {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub status_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = r#"{
        "adult": false,
        "id": 603,
        "title": "The Matrix",
        "tagline": "Welcome to the Real World.",
        "overview": "Set in the 22nd century...",
        "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
        "vote_average": 8.2,
        "runtime": 136,
        "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
        "original_language": "en",
        "release_date": "1999-03-30",
        "budget": 63000000
    }"#;

    #[test]
    fn test_parse_movie() {
        let movie: Movie = serde_json::from_str(MATRIX).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.runtime, Some(136));
        assert_eq!(movie.genre_names(), "Action, Science Fiction");
        assert_eq!(movie.language(), "EN");
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p/w500"),
            "https://image.tmdb.org/t/p/w500/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg"
        );
    }

    #[test]
    fn test_missing_poster_uses_placeholder() {
        let movie: Movie = serde_json::from_str(r#"{"id": 1, "poster_path": null}"#).unwrap();
        assert_eq!(movie.poster_url("https://img"), PLACEHOLDER_POSTER);
        assert_eq!(movie.genre_names(), "");
        assert_eq!(movie.language(), "");
    }
}
