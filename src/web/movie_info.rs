//! Movie-info backend API (`/v1/movieinfos`). Every created record is
//! published to the movie-info broadcast.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, info};

use crate::core::broadcast::BroadcastStream;
use crate::core::consumer::DemandConsumer;
use crate::domain::model::MovieInfo;
use crate::domain::ports::MovieInfoRepository;
use crate::utils::validation::validate_movie_info;
use crate::web::error::ApiError;
use crate::web::ndjson::ndjson_response;

#[derive(Clone)]
pub struct MovieInfoState {
    pub repository: Arc<dyn MovieInfoRepository>,
    pub broadcast: BroadcastStream<MovieInfo>,
    /// Demand granted per batch to each stream connection.
    pub stream_batch: u64,
}

impl MovieInfoState {
    /// Publish hook for newly created movie infos.
    pub fn publish_created(&self, movie_info: MovieInfo) {
        debug!("Publishing movie info {:?}", movie_info.movie_info_id);
        self.broadcast.publish(movie_info);
    }
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

pub fn router(state: MovieInfoState) -> Router {
    Router::new()
        .route("/v1/movieinfos", get(list_movie_infos).post(add_movie_info))
        .route("/v1/movieinfos/stream", get(stream_movie_infos))
        .route(
            "/v1/movieinfos/{id}",
            get(get_movie_info_by_id)
                .put(update_movie_info)
                .delete(delete_movie_info),
        )
        .with_state(state)
}

async fn list_movie_infos(
    State(state): State<MovieInfoState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<Vec<MovieInfo>>, ApiError> {
    let movie_infos = match query.year {
        Some(year) => {
            info!("Listing movie infos for year {}", year);
            state.repository.find_by_year(year).await?
        }
        None => state.repository.find_all().await?,
    };
    Ok(Json(movie_infos))
}

async fn get_movie_info_by_id(
    State(state): State<MovieInfoState>,
    Path(id): Path<String>,
) -> Result<Json<MovieInfo>, ApiError> {
    state
        .repository
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

async fn add_movie_info(
    State(state): State<MovieInfoState>,
    Json(movie_info): Json<MovieInfo>,
) -> Result<(StatusCode, Json<MovieInfo>), ApiError> {
    validate_movie_info(&movie_info)?;

    let saved = state.repository.save(movie_info).await?;
    state.publish_created(saved.clone());
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn update_movie_info(
    State(state): State<MovieInfoState>,
    Path(id): Path<String>,
    Json(update): Json<MovieInfo>,
) -> Result<Json<MovieInfo>, ApiError> {
    let Some(mut existing) = state.repository.find_by_id(&id).await? else {
        return Err(ApiError::NotFound(id));
    };

    existing.name = update.name;
    existing.year = update.year;
    existing.cast = update.cast;
    existing.release_date = update.release_date;
    validate_movie_info(&existing)?;

    Ok(Json(state.repository.save(existing).await?))
}

async fn delete_movie_info(
    State(state): State<MovieInfoState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.repository.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stream_movie_infos(State(state): State<MovieInfoState>) -> Response {
    let consumer = DemandConsumer::new(state.broadcast.subscribe(), state.stream_batch);
    ndjson_response(consumer.into_stream().map(Ok::<_, Infallible>))
}
