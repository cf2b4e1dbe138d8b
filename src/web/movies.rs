//! Aggregating movies API (`/v1/movies`).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures::StreamExt;
use tracing::{info, warn};

use crate::adapters::http::MovieInfoClient;
use crate::core::aggregator::MovieAggregator;
use crate::domain::model::Movie;
use crate::utils::error::{AggregateFault, ClientFault};
use crate::web::ndjson::ndjson_response;

#[derive(Clone)]
pub struct MoviesState {
    pub aggregator: MovieAggregator,
    pub movie_info_client: Arc<MovieInfoClient>,
}

pub fn router(state: MoviesState) -> Router {
    Router::new()
        .route("/v1/movies/stream", get(stream_movie_infos))
        .route("/v1/movies/{id}", get(retrieve_movie_by_id))
        .with_state(state)
}

async fn retrieve_movie_by_id(
    State(state): State<MoviesState>,
    Path(movie_id): Path<String>,
) -> Result<Json<Movie>, AggregateFault> {
    info!("Retrieving movie {}", movie_id);
    state.aggregator.aggregate(&movie_id).await.map(Json)
}

/// Pass-through of the movie-info backend's live feed. Undecodable lines are
/// skipped; a transport or status fault ends the response.
async fn stream_movie_infos(State(state): State<MoviesState>) -> Response {
    let items = state
        .movie_info_client
        .stream_movie_infos()
        .filter(|item| {
            if let Err(fault @ ClientFault::Decode { .. }) = item {
                warn!("Skipping undecodable movie info: {}", fault);
                return futures::future::ready(false);
            }
            futures::future::ready(true)
        });

    ndjson_response(items)
}
