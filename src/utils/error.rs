use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request rejected with status {status}: {message}")]
    BusinessRejection { status: u16, message: String },

    #[error("{resource} not found: {message}")]
    NotFound { resource: String, message: String },

    #[error("Discount rejected ({status}): {message}")]
    RejectedDiscount {
        status: u16,
        message: String,
        conflicted_products: Vec<String>,
    },

    #[error("Shipping estimate failed: {message}")]
    EstimationFailed { message: String },

    #[error("Order request failed: {message}")]
    OrderFailed { message: String },

    #[error("Response decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Backend unreachable or the connection broke mid-request.
    Transport,
    /// Backend answered with a well-formed refusal.
    Rejection,
    NotFound,
    Configuration,
    /// Input that never left the client, or a body we could not decode.
    Data,
}

impl ClientError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Transport(_) => ErrorCategory::Transport,
            ClientError::BusinessRejection { .. }
            | ClientError::RejectedDiscount { .. }
            | ClientError::EstimationFailed { .. }
            | ClientError::OrderFailed { .. } => ErrorCategory::Rejection,
            ClientError::NotFound { .. } => ErrorCategory::NotFound,
            ClientError::Config { .. }
            | ClientError::InvalidConfigValue { .. }
            | ClientError::Io(_) => ErrorCategory::Configuration,
            ClientError::Decode(_) | ClientError::Validation { .. } => ErrorCategory::Data,
        }
    }

    /// Message suitable for showing to an end user, without the error-kind prefix.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::Transport(_) => "Could not reach the storefront server".to_string(),
            ClientError::BusinessRejection { message, .. }
            | ClientError::NotFound { message, .. }
            | ClientError::RejectedDiscount { message, .. }
            | ClientError::EstimationFailed { message }
            | ClientError::OrderFailed { message }
            | ClientError::Config { message }
            | ClientError::Validation { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
