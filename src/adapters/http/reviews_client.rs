use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::adapters::http::check_response;
use crate::core::retry::RetryPolicy;
use crate::domain::model::Review;
use crate::domain::ports::ReviewSource;
use crate::utils::error::{ClientFault, ErrorKind, Result, ServiceError};

/// Client for the reviews backend (`GET {base}?movieInfoId={id}`).
#[derive(Clone)]
pub struct ReviewsClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl ReviewsClient {
    /// The reviews backend is eventually consistent, so `NotFound` is added
    /// to the retryable kinds of `retry`.
    pub fn new(client: Client, base_url: &str, retry: RetryPolicy) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ServiceError::InvalidConfigValueError {
            field: "clients.reviews_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            retry: retry.with_retryable(ErrorKind::NotFound),
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn url_for(&self, movie_id: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("movieInfoId", movie_id);
        url
    }

    async fn fetch_once(&self, movie_id: &str) -> std::result::Result<Vec<Review>, ClientFault> {
        let url = self.url_for(movie_id);
        debug!("Requesting reviews: {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_response(response, &format!("reviews for movie {}", movie_id)).await?;
        Ok(response.json::<Vec<Review>>().await?)
    }
}

#[async_trait]
impl ReviewSource for ReviewsClient {
    async fn retrieve_reviews(
        &self,
        movie_id: &str,
    ) -> std::result::Result<Vec<Review>, ClientFault> {
        self.retry.execute(|| self.fetch_once(movie_id)).await
    }
}
