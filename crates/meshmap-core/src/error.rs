//! Error handling for meshmap
//!
//! Provides a unified error type and result type for use across all meshmap
//! components. The reconciliation path itself is fail-soft and infallible;
//! these types cover the configuration and serialization boundaries.

/// Result type alias for meshmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for meshmap
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("prune threshold out of range");
        assert_eq!(
            err.to_string(),
            "Configuration error: prune threshold out of range"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        fn parse(input: &str) -> Result<serde_json::Value> {
            Ok(serde_json::from_str(input)?)
        }

        assert!(parse("{\"ok\": true}").is_ok());
        let err = parse("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
