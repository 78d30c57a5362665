use crate::domain::model::Id;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request rejected by server: {}", message.as_deref().unwrap_or("no message"))]
    EnvelopeFailure { message: Option<String> },

    #[error("Malformed {shape} response: {reason}")]
    MalformedResponse { shape: String, reason: String },

    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Listing {listing_id} is already a favorite of user {user_id}")]
    DuplicateFavorite { user_id: Id, listing_id: Id },

    #[error("Category {id} references unknown parent {parent_id}")]
    UnknownParent { id: Id, parent_id: Id },

    #[error("Category {id} is part of a parent cycle")]
    CategoryCycle { id: Id },

    #[error("Duplicate category {field}: {value}")]
    DuplicateCategory { field: String, value: String },

    #[error("Not authenticated: log in or provide a token first")]
    NotAuthenticated,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Contract,
    Validation,
    Authentication,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MarketError {
    pub fn malformed(shape: impl Into<String>, reason: impl Into<String>) -> Self {
        MarketError::MalformedResponse {
            shape: shape.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        MarketError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MarketError::Http(_) | MarketError::UnexpectedStatus { .. } => ErrorCategory::Network,
            MarketError::Io(_) => ErrorCategory::Io,
            MarketError::Serialization(_)
            | MarketError::EnvelopeFailure { .. }
            | MarketError::MalformedResponse { .. } => ErrorCategory::Contract,
            MarketError::ValidationError { .. }
            | MarketError::DuplicateFavorite { .. }
            | MarketError::UnknownParent { .. }
            | MarketError::CategoryCycle { .. }
            | MarketError::DuplicateCategory { .. } => ErrorCategory::Validation,
            MarketError::NotAuthenticated => ErrorCategory::Authentication,
            MarketError::ConfigError { .. }
            | MarketError::ConfigValidationError { .. }
            | MarketError::InvalidConfigValueError { .. }
            | MarketError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            MarketError::DuplicateFavorite { .. } => ErrorSeverity::Low,
            MarketError::Http(_)
            | MarketError::UnexpectedStatus { .. }
            | MarketError::EnvelopeFailure { .. } => ErrorSeverity::Medium,
            MarketError::MalformedResponse { .. } | MarketError::Serialization(_) => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    /// 稍後重試是否可能成功
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketError::Http(e) => e.is_timeout() || e.is_connect(),
            MarketError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MarketError::Http(_) => "Check network connectivity and the configured base URL",
            MarketError::UnexpectedStatus { .. } => {
                "Verify the API base URL points at the marketplace API"
            }
            MarketError::EnvelopeFailure { .. } => "Read the server message and adjust the request",
            MarketError::MalformedResponse { .. } | MarketError::Serialization(_) => {
                "The server response does not match the client contract; report it to the API owners"
            }
            MarketError::ValidationError { .. } => "Fix the highlighted field and try again",
            MarketError::DuplicateFavorite { .. } => "The listing is already in favorites",
            MarketError::UnknownParent { .. }
            | MarketError::CategoryCycle { .. }
            | MarketError::DuplicateCategory { .. } => {
                "The category list from the server is inconsistent; refresh and report it"
            }
            MarketError::NotAuthenticated => "Run `marketplace login` or pass --token",
            MarketError::Io(_) => "Check that the file exists and is readable",
            MarketError::ConfigError { .. }
            | MarketError::ConfigValidationError { .. }
            | MarketError::InvalidConfigValueError { .. }
            | MarketError::MissingConfigError { .. } => "Review the configuration file and flags",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MarketError::EnvelopeFailure { message: Some(m) } => m.clone(),
            MarketError::EnvelopeFailure { message: None } => {
                "The server rejected the request".to_string()
            }
            MarketError::Http(_) => "Could not reach the marketplace server".to_string(),
            MarketError::MalformedResponse { shape, .. } => {
                format!("The server sent an invalid {} response", shape)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_failure_message() {
        let err = MarketError::EnvelopeFailure {
            message: Some("Email already registered".to_string()),
        };
        assert_eq!(err.category(), ErrorCategory::Contract);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Email already registered");
        assert!(err.to_string().contains("Email already registered"));
    }

    #[test]
    fn test_malformed_is_critical_and_not_retryable() {
        let err = MarketError::malformed("Listing", "price must be non-negative");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Malformed Listing response: price must be non-negative"
        );
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = MarketError::UnexpectedStatus {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_retryable());

        let err = MarketError::UnexpectedStatus {
            status: 404,
            body: String::new(),
        };
        assert!(!err.is_retryable());
    }
}
