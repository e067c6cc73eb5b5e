use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque movie identifier.
///
/// Clients send it either as a JSON string or a JSON integer (catalog ids are
/// numeric). It is kept as text and written back as an integer whenever the
/// text is a canonical decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieId(String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        MovieId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn as_integer(&self) -> Option<i64> {
        let n = self.0.parse::<i64>().ok()?;
        (n.to_string() == self.0).then_some(n)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        MovieId(id.to_string())
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        MovieId(id.to_string())
    }
}

impl Serialize for MovieId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => MovieId::from(n),
            // 42.0 names the same movie as 42.
            Raw::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => MovieId::from(f as i64),
            Raw::Float(f) => MovieId(f.to_string()),
            Raw::Str(s) => MovieId(s),
        })
    }
}

/// One persisted (movie, user) favorite. Display fields are copied from the
/// catalog when the record is created and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub id: String,
    pub movie_id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    pub liked_by: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when adding a favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFavorite {
    pub movie_id: MovieId,
    pub title: Option<String>,
    pub poster: Option<String>,
    pub rating: Option<f64>,
    pub liked_by: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_accepts_number_or_string() {
        let id: MovieId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
        let id: MovieId = serde_json::from_str("\"tt0133093\"").unwrap();
        assert_eq!(id.as_str(), "tt0133093");
    }

    #[test]
    fn test_movie_id_accepts_whole_floats() {
        let id: MovieId = serde_json::from_str("42.0").unwrap();
        assert_eq!(id, MovieId::from(42));
        let id: MovieId = serde_json::from_str("42.5").unwrap();
        assert_eq!(id.as_str(), "42.5");
    }

    #[test]
    fn test_movie_id_serializes_integers_as_numbers() {
        assert_eq!(serde_json::to_string(&MovieId::from(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&MovieId::from("007")).unwrap(), "\"007\"");
        assert_eq!(serde_json::to_string(&MovieId::from("abc")).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_blank_movie_id_is_empty() {
        assert!(MovieId::from("  ").is_empty());
        assert!(!MovieId::from(0).is_empty());
    }
}
