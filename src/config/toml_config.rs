use crate::core::broadcast::Retention;
use crate::core::retry::RetryPolicy;
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{validate_positive_number, validate_socket_addr, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub clients: ClientsConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientsConfig {
    #[serde(default = "default_movie_info_url")]
    pub movie_info_url: String,
    #[serde(default = "default_reviews_url")]
    pub reviews_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ClientsConfig {
    fn default() -> Self {
        Self {
            movie_info_url: default_movie_info_url(),
            reviews_url: default_reviews_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_fixed_delay_ms")]
    pub fixed_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            fixed_delay_ms: default_fixed_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default)]
    pub movie_info_retention: Retention,
    #[serde(default = "default_review_retention")]
    pub review_retention: Retention,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            movie_info_retention: Retention::ReplayAll,
            review_retention: default_review_retention(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8082".to_string()
}

fn default_movie_info_url() -> String {
    "http://localhost:8080/v1/movieinfos".to_string()
}

fn default_reviews_url() -> String {
    "http://localhost:8081/v1/reviews".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_fixed_delay_ms() -> u64 {
    1000
}

fn default_review_retention() -> Retention {
    Retention::ReplayLatest
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.fixed_delay_ms),
        )
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.clients.timeout_seconds)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validate_socket_addr("server.bind", &self.server.bind)?;
        validate_url("clients.movie_info_url", &self.clients.movie_info_url)?;
        validate_url("clients.reviews_url", &self.clients.reviews_url)?;
        validate_positive_number("clients.timeout_seconds", self.clients.timeout_seconds, 1)?;
        validate_positive_number("retry.max_attempts", u64::from(self.retry.max_attempts), 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry_policy().fixed_delay(), Duration::from_secs(1));
        assert_eq!(config.broadcast.movie_info_retention, Retention::ReplayAll);
        assert_eq!(config.broadcast.review_retention, Retention::ReplayLatest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
bind = "0.0.0.0:9000"

[clients]
movie_info_url = "http://info:8080/v1/movieinfos"
reviews_url = "http://reviews:8081/v1/reviews"
timeout_seconds = 5

[retry]
max_attempts = 5
fixed_delay_ms = 250

[broadcast]
movie_info_retention = "replay-latest"
review_retention = "replay-all"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.client_timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_policy().max_attempts(), 5);
        assert_eq!(config.retry_policy().fixed_delay(), Duration::from_millis(250));
        assert_eq!(config.broadcast.movie_info_retention, Retention::ReplayLatest);
        assert_eq!(config.broadcast.review_retention, Retention::ReplayAll);
    }

    #[test]
    fn test_unknown_retention_rejected() {
        let result = ServiceConfig::from_toml_str("[broadcast]\nreview_retention = \"replay-some\"\n");
        assert!(matches!(result, Err(ServiceError::ConfigError { .. })));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MOVIES_SERVICE_TEST_INFO_URL", "http://env-host:8080/v1/movieinfos");

        let toml_content = r#"
[clients]
movie_info_url = "${MOVIES_SERVICE_TEST_INFO_URL}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.clients.movie_info_url, "http://env-host:8080/v1/movieinfos");

        std::env::remove_var("MOVIES_SERVICE_TEST_INFO_URL");
    }

    #[test]
    fn test_config_validation() {
        let config = ServiceConfig::from_toml_str("[clients]\nreviews_url = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[server]\nbind = \"localhost\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[retry]\nmax_attempts = 2\n")
            .unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.retry.max_attempts, 2);
    }
}
