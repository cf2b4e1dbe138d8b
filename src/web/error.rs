use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::utils::error::{AggregateFault, ClientFault, ErrorKind, ServiceError, ValidationError};

/// Transport status for a downstream fault. An exhausted server-error retry
/// reports 503; other exhausted retries report their last fault.
pub fn client_fault_status(fault: &ClientFault) -> StatusCode {
    match fault {
        ClientFault::NotFound { .. } => StatusCode::NOT_FOUND,
        ClientFault::ClientError { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
        }
        ClientFault::ServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        ClientFault::Transport { .. } | ClientFault::Decode { .. } => StatusCode::BAD_GATEWAY,
        ClientFault::RetryExhausted { last, .. } => match last.kind() {
            ErrorKind::ServerError => StatusCode::SERVICE_UNAVAILABLE,
            _ => client_fault_status(last),
        },
    }
}

pub fn aggregate_fault_status(fault: &AggregateFault) -> StatusCode {
    match fault {
        AggregateFault::MovieInfo(inner) | AggregateFault::Reviews(inner) => client_fault_status(inner),
        AggregateFault::Invalid(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for AggregateFault {
    fn into_response(self) -> Response {
        (aggregate_fault_status(&self), self.to_string()).into_response()
    }
}

/// Error returned by the backend handlers.
#[derive(Debug)]
pub enum ApiError {
    Invalid(ValidationError),
    NotFound(String),
    Internal(ServiceError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Invalid(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ValidationError(e) => ApiError::Invalid(e),
            ServiceError::NotFound { id } => ApiError::NotFound(id),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(e) => (StatusCode::BAD_REQUEST, e.message).into_response(),
            ApiError::NotFound(id) => {
                (StatusCode::NOT_FOUND, format!("No record found for id: {}", id)).into_response()
            }
            ApiError::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error() -> ClientFault {
        ClientFault::ServerError {
            message: "down".to_string(),
        }
    }

    #[test]
    fn test_client_fault_status_mapping() {
        let not_found = ClientFault::NotFound {
            resource: "abc".to_string(),
        };
        assert_eq!(client_fault_status(&not_found), StatusCode::NOT_FOUND);
        assert_eq!(
            client_fault_status(&ClientFault::ClientError {
                message: "gone".to_string(),
                status: 410
            }),
            StatusCode::GONE
        );
        assert_eq!(client_fault_status(&server_error()), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            client_fault_status(&ClientFault::RetryExhausted {
                attempts: 3,
                last: Box::new(server_error())
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            client_fault_status(&ClientFault::RetryExhausted {
                attempts: 3,
                last: Box::new(not_found)
            }),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_invalid_aggregate_is_bad_request() {
        let fault = AggregateFault::Invalid(ValidationError::new("movieId must be present"));
        assert_eq!(aggregate_fault_status(&fault), StatusCode::BAD_REQUEST);
    }
}
