//! # Movie Aggregator
//!
//! Composes one movie-info lookup and one reviews lookup into a [`Movie`].
//!
//! The two dependencies are treated asymmetrically:
//! - movie info is mandatory: any fault fails the whole aggregation
//! - reviews are optional only in the `NotFound` sense: once the reviews
//!   client has exhausted its retries on `NotFound`, the movie is returned
//!   with an empty review list. Every other reviews fault still fails.
//!
//! Both lookups run concurrently on the caller's task. A movie-info fault
//! completes the aggregation immediately and drops the in-flight reviews
//! lookup together with any pending retry delay.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::domain::model::{Movie, MovieInfo, Review};
use crate::domain::ports::{MovieInfoSource, ReviewSource};
use crate::utils::error::{AggregateFault, ClientFault, ErrorKind};
use crate::utils::validation::validate_movie_id;

/// Applies the mandatory-dependency rule to a movie-info outcome.
pub fn resolve_movie_info(
    outcome: Result<MovieInfo, ClientFault>,
) -> Result<MovieInfo, AggregateFault> {
    outcome.map_err(AggregateFault::MovieInfo)
}

/// Applies the optional-dependency rule to a reviews outcome: `NotFound`
/// (directly or as the last fault of an exhausted retry) becomes an empty
/// list, anything else propagates.
pub fn resolve_reviews(
    outcome: Result<Vec<Review>, ClientFault>,
) -> Result<Vec<Review>, AggregateFault> {
    match outcome {
        Ok(reviews) => Ok(reviews),
        Err(fault) if fault.kind() == ErrorKind::NotFound => {
            warn!("No reviews available, continuing with an empty list: {}", fault);
            Ok(Vec::new())
        }
        Err(fault) => Err(AggregateFault::Reviews(fault)),
    }
}

#[derive(Clone)]
pub struct MovieAggregator {
    movie_info: Arc<dyn MovieInfoSource>,
    reviews: Arc<dyn ReviewSource>,
}

impl MovieAggregator {
    pub fn new(movie_info: Arc<dyn MovieInfoSource>, reviews: Arc<dyn ReviewSource>) -> Self {
        Self {
            movie_info,
            reviews,
        }
    }

    /// Builds the composite movie for `movie_id`. The caller gets either a
    /// complete movie or a single typed fault.
    pub async fn aggregate(&self, movie_id: &str) -> Result<Movie, AggregateFault> {
        validate_movie_id(movie_id)?;
        let start_time = Instant::now();

        let movie_info = async {
            resolve_movie_info(self.movie_info.retrieve_movie_info(movie_id).await)
        };
        let reviews = async { resolve_reviews(self.reviews.retrieve_reviews(movie_id).await) };

        match tokio::try_join!(movie_info, reviews) {
            Ok((movie_info, reviews)) => {
                info!(
                    "Aggregated movie {} with {} reviews in {:.2?}",
                    movie_id,
                    reviews.len(),
                    start_time.elapsed()
                );
                Ok(Movie::new(movie_info, reviews))
            }
            Err(fault) => {
                error!("Aggregation of movie {} failed: {}", movie_id, fault);
                Err(fault)
            }
        }
    }
}
