pub mod aggregator;
pub mod broadcast;
pub mod consumer;
pub mod retry;

pub use crate::domain::model::{Movie, MovieInfo, Review};
pub use crate::domain::ports::{MovieInfoRepository, MovieInfoSource, ReviewRepository, ReviewSource};
pub use crate::utils::error::Result;
