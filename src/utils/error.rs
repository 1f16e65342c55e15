use thiserror::Error;

#[derive(Error, Debug)]
pub enum AipError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing env: set {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Usage: {usage}")]
    UsageError { usage: String },

    #[error("Unknown tool: {name}. Usage: {usage}")]
    UnknownToolError { name: String, usage: String },

    #[error("Invalid {field}: {value}")]
    InvalidArgumentError { field: String, value: String },

    #[error("Invalid JSON: {reason}")]
    InvalidPayloadError { reason: String },

    #[error("Platform error {status}: {message}")]
    PlatformError { status: u16, message: String },

    #[error("{message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, AipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message_matches_cli_contract() {
        let err = AipError::MissingConfigError {
            field: "USER_WALLET_ADDRESS".to_string(),
        };
        assert_eq!(err.to_string(), "Missing env: set USER_WALLET_ADDRESS");
    }

    #[test]
    fn test_usage_error_message() {
        let err = AipError::UsageError {
            usage: "health_check".to_string(),
        };
        assert_eq!(err.to_string(), "Usage: health_check");
    }

    #[test]
    fn test_platform_error_carries_status() {
        let err = AipError::PlatformError {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(err.to_string().contains("502"));
    }
}
