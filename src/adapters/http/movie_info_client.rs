use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::adapters::http::{check_response, ndjson::decode_ndjson};
use crate::core::retry::RetryPolicy;
use crate::domain::model::MovieInfo;
use crate::domain::ports::MovieInfoSource;
use crate::utils::error::{ClientFault, Result, ServiceError};
use crate::utils::validation::{validate_movie_id, STREAM_SEGMENT};

/// Client for the movie-info backend (`GET {base}/{id}`, `GET {base}/stream`).
#[derive(Clone)]
pub struct MovieInfoClient {
    client: Client,
    base_url: Url,
    stream_url: Url,
    retry: RetryPolicy,
}

impl MovieInfoClient {
    pub fn new(client: Client, base_url: &str, retry: RetryPolicy) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ServiceError::InvalidConfigValueError {
            field: "clients.movie_info_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfigValueError {
                field: "clients.movie_info_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let stream_url = append_segment(&base_url, STREAM_SEGMENT);
        Ok(Self {
            client,
            base_url,
            stream_url,
            retry,
        })
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn url_for(&self, movie_id: &str) -> Url {
        append_segment(&self.base_url, movie_id)
    }

    async fn fetch_once(&self, movie_id: &str) -> std::result::Result<MovieInfo, ClientFault> {
        let url = self.url_for(movie_id);
        debug!("Requesting movie info: {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_response(response, &format!("movie info {}", movie_id)).await?;
        Ok(response.json::<MovieInfo>().await?)
    }

    /// Live feed of newly created movie infos from `GET {base}/stream`.
    /// The feed is not retried; a broken connection ends the stream with a
    /// transport fault.
    pub fn stream_movie_infos(
        &self,
    ) -> impl Stream<Item = std::result::Result<MovieInfo, ClientFault>> + Send + 'static {
        let request = self.client.get(self.stream_url.clone());

        futures::stream::once(async move {
            match request.send().await {
                Ok(response) => check_response(response, "movie info stream").await,
                Err(e) => Err(ClientFault::from(e)),
            }
        })
        .map_ok(|response| decode_ndjson(response.bytes_stream()))
        .try_flatten()
    }
}

#[async_trait]
impl MovieInfoSource for MovieInfoClient {
    async fn retrieve_movie_info(
        &self,
        movie_id: &str,
    ) -> std::result::Result<MovieInfo, ClientFault> {
        validate_movie_id(movie_id).map_err(|e| ClientFault::ClientError {
            message: e.message,
            status: 400,
        })?;
        self.retry.execute(|| self.fetch_once(movie_id)).await
    }
}

fn append_segment(base_url: &Url, segment: &str) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base: &str) -> Result<MovieInfoClient> {
        MovieInfoClient::new(Client::new(), base, RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[test]
    fn test_url_for_appends_segment() {
        let client = client("http://localhost:8080/v1/movieinfos").unwrap();
        assert_eq!(
            client.url_for("abc").as_str(),
            "http://localhost:8080/v1/movieinfos/abc"
        );

        let client = self::client("http://localhost:8080/v1/movieinfos/").unwrap();
        assert_eq!(
            client.url_for("abc").as_str(),
            "http://localhost:8080/v1/movieinfos/abc"
        );
        assert_eq!(
            client.stream_url.as_str(),
            "http://localhost:8080/v1/movieinfos/stream"
        );
    }

    #[tokio::test]
    async fn test_reserved_ids_rejected_before_any_request() {
        // Nothing listens on the discard port, so any request would be a
        // transport fault.
        let client = client("http://127.0.0.1:9/v1/movieinfos").unwrap();

        for id in [".", "..", "stream"] {
            let fault = client.retrieve_movie_info(id).await.unwrap_err();
            assert!(
                matches!(fault, ClientFault::ClientError { status: 400, .. }),
                "{:?}",
                fault
            );
        }
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            client("not a url"),
            Err(ServiceError::InvalidConfigValueError { .. })
        ));
        assert!(client("mailto:someone@example.com").is_err());
    }
}
