use crate::domain::model::{MovieInfo, Review};
use crate::utils::error::{ClientFault, Result};
use async_trait::async_trait;

/// Downstream lookup of movie metadata by id.
#[async_trait]
pub trait MovieInfoSource: Send + Sync {
    async fn retrieve_movie_info(&self, movie_id: &str) -> std::result::Result<MovieInfo, ClientFault>;
}

/// Downstream lookup of the reviews attached to a movie id.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn retrieve_reviews(&self, movie_id: &str) -> std::result::Result<Vec<Review>, ClientFault>;
}

/// Storage collaborator for movie metadata. Ids are assigned on insert.
#[async_trait]
pub trait MovieInfoRepository: Send + Sync {
    async fn save(&self, movie_info: MovieInfo) -> Result<MovieInfo>;
    async fn find_all(&self) -> Result<Vec<MovieInfo>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<MovieInfo>>;
    async fn find_by_year(&self, year: i32) -> Result<Vec<MovieInfo>>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

/// Storage collaborator for reviews, queryable by the movie they belong to.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn save(&self, review: Review) -> Result<Review>;
    async fn find_all(&self) -> Result<Vec<Review>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Review>>;
    async fn find_by_movie_info_id(&self, movie_info_id: i64) -> Result<Vec<Review>>;
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}
