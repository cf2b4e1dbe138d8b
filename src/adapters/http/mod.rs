//! HTTP adapters for the movie-info and reviews backends.
//!
//! Both clients share one `reqwest::Client` (connection pooling) and the
//! same response classification:
//!
//! | status        | fault                       | retried by default |
//! |---------------|-----------------------------|--------------------|
//! | 2xx           | -                           | -                  |
//! | 404           | `ClientFault::NotFound`     | reviews only       |
//! | other 4xx     | `ClientFault::ClientError`  | no                 |
//! | 5xx           | `ClientFault::ServerError`  | yes                |

pub mod movie_info_client;
pub mod ndjson;
pub mod reviews_client;

use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::debug;

use crate::utils::error::{ClientFault, Result};

pub use movie_info_client::MovieInfoClient;
pub use reviews_client::ReviewsClient;

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("movies-service/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Maps a non-success status to its fault. `body` is the response text,
/// used as the message when the backend sent one.
pub fn classify_status(status: StatusCode, body: &str, resource: &str) -> ClientFault {
    let body = body.trim();

    if status == StatusCode::NOT_FOUND {
        ClientFault::NotFound {
            resource: resource.to_string(),
        }
    } else if status.is_server_error() {
        ClientFault::ServerError {
            message: if body.is_empty() {
                format!("{} responded with {}", resource, status)
            } else {
                format!("{} responded with {}: {}", resource, status, body)
            },
        }
    } else {
        ClientFault::ClientError {
            message: if body.is_empty() {
                status.canonical_reason().unwrap_or("Unexpected status").to_string()
            } else {
                body.to_string()
            },
            status: status.as_u16(),
        }
    }
}

pub(crate) async fn check_response(
    response: Response,
    resource: &str,
) -> std::result::Result<Response, ClientFault> {
    let status = response.status();
    debug!("{} responded with status {}", resource, status);

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body, resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let fault = classify_status(StatusCode::NOT_FOUND, "", "movie info abc");
        assert_eq!(
            fault,
            ClientFault::NotFound {
                resource: "movie info abc".to_string()
            }
        );
    }

    #[test]
    fn test_classify_client_error_keeps_status_and_body() {
        let fault = classify_status(StatusCode::BAD_REQUEST, "movieInfo.name must be present", "x");
        assert_eq!(
            fault,
            ClientFault::ClientError {
                message: "movieInfo.name must be present".to_string(),
                status: 400
            }
        );

        let fault = classify_status(StatusCode::CONFLICT, "  ", "x");
        assert_eq!(
            fault,
            ClientFault::ClientError {
                message: "Conflict".to_string(),
                status: 409
            }
        );
    }

    #[test]
    fn test_classify_server_error() {
        let fault = classify_status(
            StatusCode::SERVICE_UNAVAILABLE,
            "Movieinfoservice unavailable",
            "movie info abc",
        );
        match fault {
            ClientFault::ServerError { message } => {
                assert!(message.contains("503"));
                assert!(message.contains("Movieinfoservice unavailable"));
            }
            other => panic!("expected ServerError, got {:?}", other),
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
