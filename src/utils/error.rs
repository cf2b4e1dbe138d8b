use thiserror::Error;

/// Classification of a failed downstream call, independent of how the
/// failure is represented. Retry policies are expressed as sets of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ClientError,
    ServerError,
    Transport,
    Decode,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientFault {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Client error ({status}): {message}")]
    ClientError { message: String, status: u16 },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Invalid response body: {message}")]
    Decode { message: String },

    #[error("Retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted { attempts: u32, last: Box<ClientFault> },
}

impl ClientFault {
    /// Kind of this fault. `RetryExhausted` reports the kind of the last
    /// fault it wraps.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientFault::NotFound { .. } => ErrorKind::NotFound,
            ClientFault::ClientError { .. } => ErrorKind::ClientError,
            ClientFault::ServerError { .. } => ErrorKind::ServerError,
            ClientFault::Transport { .. } => ErrorKind::Transport,
            ClientFault::Decode { .. } => ErrorKind::Decode,
            ClientFault::RetryExhausted { last, .. } => last.kind(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, ClientFault::RetryExhausted { .. })
    }
}

impl From<reqwest::Error> for ClientFault {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientFault::Decode {
                message: err.to_string(),
            }
        } else {
            ClientFault::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// Input rejected before any downstream call or storage write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of one aggregation request. Only mandatory-dependency faults and
/// non-`NotFound` review faults end up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateFault {
    #[error("Movie info lookup failed: {0}")]
    MovieInfo(ClientFault),

    #[error("Reviews lookup failed: {0}")]
    Reviews(ClientFault),

    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationError),
}

impl AggregateFault {
    pub fn client_fault(&self) -> Option<&ClientFault> {
        match self {
            AggregateFault::MovieInfo(fault) | AggregateFault::Reviews(fault) => Some(fault),
            AggregateFault::Invalid(_) => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Record not found: {id}")]
    NotFound { id: String },
}

pub type Result<T> = std::result::Result<T, ServiceError>;
