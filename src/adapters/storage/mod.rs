//! In-memory storage collaborators. Records keep insertion order; saving a
//! record whose id already exists replaces it in place.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::model::{MovieInfo, Review};
use crate::domain::ports::{MovieInfoRepository, ReviewRepository};
use crate::utils::error::Result;

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Default)]
pub struct InMemoryMovieInfoRepository {
    records: RwLock<Vec<MovieInfo>>,
}

impl InMemoryMovieInfoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieInfoRepository for InMemoryMovieInfoRepository {
    async fn save(&self, mut movie_info: MovieInfo) -> Result<MovieInfo> {
        let id = movie_info.movie_info_id.get_or_insert_with(generate_id).clone();
        let mut records = self.records.write().await;

        match records
            .iter_mut()
            .find(|r| r.movie_info_id.as_deref() == Some(id.as_str()))
        {
            Some(existing) => *existing = movie_info.clone(),
            None => records.push(movie_info.clone()),
        }
        Ok(movie_info)
    }

    async fn find_all(&self) -> Result<Vec<MovieInfo>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<MovieInfo>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.movie_info_id.as_deref() == Some(id))
            .cloned())
    }

    async fn find_by_year(&self, year: i32) -> Result<Vec<MovieInfo>> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| r.year == year).cloned().collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.movie_info_id.as_deref() != Some(id));
        Ok(records.len() != before)
    }
}

#[derive(Default)]
pub struct InMemoryReviewRepository {
    records: RwLock<Vec<Review>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn save(&self, mut review: Review) -> Result<Review> {
        let id = review.review_id.get_or_insert_with(generate_id).clone();
        let mut records = self.records.write().await;

        match records
            .iter_mut()
            .find(|r| r.review_id.as_deref() == Some(id.as_str()))
        {
            Some(existing) => *existing = review.clone(),
            None => records.push(review.clone()),
        }
        Ok(review)
    }

    async fn find_all(&self) -> Result<Vec<Review>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Review>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.review_id.as_deref() == Some(id))
            .cloned())
    }

    async fn find_by_movie_info_id(&self, movie_info_id: i64) -> Result<Vec<Review>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.movie_info_id == Some(movie_info_id))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.review_id.as_deref() != Some(id));
        Ok(records.len() != before)
    }
}
