//! HTTP surfaces: the aggregating movies API and the two backend APIs.

pub mod error;
pub mod movie_info;
pub mod movies;
pub mod ndjson;
pub mod reviews;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::utils::error::Result;

pub use error::ApiError;
pub use movie_info::MovieInfoState;
pub use movies::MoviesState;
pub use reviews::ReviewsState;

/// Serves `router` on `bind` until Ctrl-C.
pub async fn serve(router: Router, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
