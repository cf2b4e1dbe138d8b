use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_info_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "releaseYear")]
    pub year: i32,
    #[serde(default)]
    pub cast: Vec<String>,
    pub release_date: NaiveDate,
}

impl MovieInfo {
    pub fn new(name: impl Into<String>, year: i32, cast: Vec<String>, release_date: NaiveDate) -> Self {
        Self {
            movie_info_id: None,
            name: name.into(),
            year,
            cast,
            release_date,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.movie_info_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<String>,
    #[serde(default)]
    pub movie_info_id: Option<i64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub rating: f64,
}

impl Review {
    pub fn new(movie_info_id: i64, comment: impl Into<String>, rating: f64) -> Self {
        Self {
            review_id: None,
            movie_info_id: Some(movie_info_id),
            comment: comment.into(),
            rating,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.review_id = Some(id.into());
        self
    }
}

/// Composite built per aggregation request; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_info: MovieInfo,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Movie {
    pub fn new(movie_info: MovieInfo, reviews: Vec<Review>) -> Self {
        Self {
            movie_info,
            reviews,
        }
    }
}
