pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
pub mod web;

pub use config::ServiceConfig;
pub use core::aggregator::MovieAggregator;
pub use core::broadcast::{BroadcastStream, Retention, Subscription};
pub use core::consumer::DemandConsumer;
pub use core::retry::RetryPolicy;
pub use domain::model::{Movie, MovieInfo, Review};
pub use utils::error::{AggregateFault, ClientFault, ErrorKind, Result, ServiceError};
