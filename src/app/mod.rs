//! Wiring of configuration, clients, storage and broadcasts into routers.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::adapters::http::{build_http_client, MovieInfoClient, ReviewsClient};
use crate::adapters::storage::{InMemoryMovieInfoRepository, InMemoryReviewRepository};
use crate::config::ServiceConfig;
use crate::core::aggregator::MovieAggregator;
use crate::core::broadcast::BroadcastStream;
use crate::utils::error::Result;
use crate::web::{movie_info, movies, reviews, MovieInfoState, MoviesState, ReviewsState};

/// Items granted per batch to each NDJSON stream connection.
pub const STREAM_BATCH: u64 = 16;

pub fn movies_app(config: &ServiceConfig) -> Result<Router> {
    let http = build_http_client(config.client_timeout())?;
    let retry = config.retry_policy();

    let movie_info_client = Arc::new(MovieInfoClient::new(
        http.clone(),
        &config.clients.movie_info_url,
        retry.clone(),
    )?);
    let reviews_client = Arc::new(ReviewsClient::new(http, &config.clients.reviews_url, retry)?);

    info!(
        "Movies API using movie info at {} and reviews at {} ({} attempts, {:?} delay)",
        config.clients.movie_info_url,
        config.clients.reviews_url,
        config.retry.max_attempts,
        config.retry_policy().fixed_delay()
    );

    let aggregator = MovieAggregator::new(movie_info_client.clone(), reviews_client);
    Ok(movies::router(MoviesState {
        aggregator,
        movie_info_client,
    }))
}

pub fn movie_info_app(config: &ServiceConfig) -> (Router, MovieInfoState) {
    let state = MovieInfoState {
        repository: Arc::new(InMemoryMovieInfoRepository::new()),
        broadcast: BroadcastStream::new(config.broadcast.movie_info_retention),
        stream_batch: STREAM_BATCH,
    };
    info!("Movie info stream retention: {}", state.broadcast.retention());
    (movie_info::router(state.clone()), state)
}

pub fn reviews_app(config: &ServiceConfig) -> (Router, ReviewsState) {
    let state = ReviewsState {
        repository: Arc::new(InMemoryReviewRepository::new()),
        broadcast: BroadcastStream::new(config.broadcast.review_retention),
        stream_batch: STREAM_BATCH,
    };
    info!("Review stream retention: {}", state.broadcast.retention());
    (reviews::router(state.clone()), state)
}
