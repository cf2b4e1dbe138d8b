//! Reviews backend API (`/v1/reviews`). Every created review is published
//! to the reviews broadcast.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, put};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;

use crate::core::broadcast::BroadcastStream;
use crate::core::consumer::DemandConsumer;
use crate::domain::model::Review;
use crate::domain::ports::ReviewRepository;
use crate::utils::error::ValidationError;
use crate::utils::validation::validate_review;
use crate::web::error::ApiError;
use crate::web::ndjson::ndjson_response;

#[derive(Clone)]
pub struct ReviewsState {
    pub repository: Arc<dyn ReviewRepository>,
    pub broadcast: BroadcastStream<Review>,
    pub stream_batch: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub movie_info_id: Option<String>,
}

pub fn router(state: ReviewsState) -> Router {
    Router::new()
        .route("/v1/reviews", get(get_reviews).post(add_review))
        .route("/v1/reviews/stream", get(stream_reviews))
        .route("/v1/reviews/{id}", put(update_review).delete(delete_review))
        .with_state(state)
}

async fn get_reviews(
    State(state): State<ReviewsState>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = match query.movie_info_id {
        Some(raw) => {
            let movie_info_id = raw.parse::<i64>().map_err(|_| {
                ValidationError::new(format!("movieInfoId must be an integer: {}", raw))
            })?;
            state.repository.find_by_movie_info_id(movie_info_id).await?
        }
        None => state.repository.find_all().await?,
    };
    Ok(Json(reviews))
}

async fn add_review(
    State(state): State<ReviewsState>,
    Json(review): Json<Review>,
) -> Result<(StatusCode, Json<Review>), ApiError> {
    validate_review(&review)?;

    let saved = state.repository.save(review).await?;
    state.broadcast.publish(saved.clone());
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_review(
    State(state): State<ReviewsState>,
    Path(id): Path<String>,
    Json(update): Json<Review>,
) -> Result<Json<Review>, ApiError> {
    let Some(mut existing) = state.repository.find_by_id(&id).await? else {
        return Err(ApiError::NotFound(id));
    };

    existing.comment = update.comment;
    existing.rating = update.rating;
    validate_review(&existing)?;

    Ok(Json(state.repository.save(existing).await?))
}

async fn delete_review(
    State(state): State<ReviewsState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.repository.delete_by_id(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(id))
    }
}

async fn stream_reviews(State(state): State<ReviewsState>) -> Response {
    let consumer = DemandConsumer::new(state.broadcast.subscribe(), state.stream_batch);
    ndjson_response(consumer.into_stream().map(Ok::<_, Infallible>))
}
