use thiserror::Error;

/// Errors raised while loading or validating relay configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read configuration: {0}")]
    Io(String),
}

/// Errors from key-value store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by a single relay request.
///
/// Every variant is reported to the caller on the same request; nothing is
/// retried or deferred.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The upstream answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The upstream answered successfully but carried no text.
    #[error("upstream returned an empty response")]
    EmptyResponse,

    /// Any other parse, transport or runtime failure.
    #[error("{0}")]
    Unhandled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = RelayError::Upstream {
            status: 401,
            message: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API error (401): bad key");
    }

    #[test]
    fn test_config_error_converts() {
        let err: RelayError = ConfigError::Missing("api_url").into();
        assert_eq!(
            err.to_string(),
            "configuration error: missing required setting: api_url"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Backend("disk full".to_string());
        assert_eq!(err.to_string(), "store backend error: disk full");
    }
}
