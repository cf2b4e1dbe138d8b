use crate::domain::model::{MovieInfo, Review};
use crate::utils::error::{Result, ServiceError, ValidationError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ServiceError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|e| ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

/// Path segment of the movie-info live feed, next to the per-id lookups.
pub const STREAM_SEGMENT: &str = "stream";

/// Movie ids are used as a path segment downstream, so they must be a single
/// non-empty segment that addresses one record.
pub fn validate_movie_id(movie_id: &str) -> std::result::Result<(), ValidationError> {
    if movie_id.trim().is_empty() {
        return Err(ValidationError::new("movieId must be present"));
    }
    if movie_id.contains('/') || movie_id.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(format!(
            "movieId contains invalid characters: {:?}",
            movie_id
        )));
    }
    if matches!(movie_id, "." | ".." | STREAM_SEGMENT) {
        return Err(ValidationError::new(format!(
            "movieId is a reserved path segment: {:?}",
            movie_id
        )));
    }
    Ok(())
}

fn collect_violations(mut violations: Vec<&str>) -> std::result::Result<(), ValidationError> {
    if violations.is_empty() {
        return Ok(());
    }
    violations.sort_unstable();
    Err(ValidationError::new(violations.join(",")))
}

pub fn validate_movie_info(movie_info: &MovieInfo) -> std::result::Result<(), ValidationError> {
    let mut violations = Vec::new();

    if movie_info.name.trim().is_empty() {
        violations.push("movieInfo.name must be present");
    }
    if movie_info.year <= 0 {
        violations.push("movieInfo.year must be a positive value");
    }
    if movie_info.cast.is_empty() || movie_info.cast.iter().any(|c| c.trim().is_empty()) {
        violations.push("movieInfo.cast must be present");
    }

    collect_violations(violations)
}

pub fn validate_review(review: &Review) -> std::result::Result<(), ValidationError> {
    let mut violations = Vec::new();

    if review.movie_info_id.is_none() {
        violations.push("rating.movieInfoId : must not be null");
    }
    if review.rating < 0.0 || review.rating.is_nan() {
        violations.push("rating.negative : please pass a non-negative value");
    }

    collect_violations(violations)
}
