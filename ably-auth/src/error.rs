// Error handling for the Ably authentication core
// Every error carries an Ably code and an HTTP-equivalent status where one applies

pub mod codes;

use thiserror::Error;

pub use codes::{http_to_ably_code, parse_ably_error, AblyErrorCode};

/// Type alias for Ably results
pub type AblyResult<T> = Result<T, AblyError>;

#[derive(Debug, Error)]
pub enum AblyError {
    /// Fatal misconfiguration detected while constructing or using `Auth`
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        code: AblyErrorCode,
        status: u16,
    },

    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        code: AblyErrorCode,
        status: u16,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        retryable: bool,
    },

    /// Non-2xx response reported by the transport
    #[error("API error {code} (status {status}): {message}")]
    Api {
        status: u16,
        code: u16,
        message: String,
    },

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AblyError {
    /// Create a configuration error using the status paired with `code`
    pub fn configuration(code: AblyErrorCode, message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            code,
            status: code.http_status(),
        }
    }

    /// Create an authentication error using the status paired with `code`
    pub fn authentication(code: AblyErrorCode, message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code,
            status: code.http_status(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
            retryable: true,
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
            retryable: true,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Create an API error from an HTTP status and Ably code
    pub fn api(status: u16, code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    /// Numeric Ably error code, if known
    pub fn code(&self) -> Option<u16> {
        match self {
            AblyError::Configuration { code, .. } | AblyError::Authentication { code, .. } => {
                Some(code.to_u16())
            }
            AblyError::Api { code, .. } => Some(*code),
            AblyError::Network { .. } | AblyError::Decode { .. } => None,
        }
    }

    /// HTTP-equivalent status, if known
    pub fn status(&self) -> Option<u16> {
        match self {
            AblyError::Configuration { status, .. }
            | AblyError::Authentication { status, .. }
            | AblyError::Api { status, .. } => Some(*status),
            AblyError::Network { .. } | AblyError::Decode { .. } => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AblyError::Configuration { .. } => ErrorCategory::Configuration,
            AblyError::Authentication { .. } => ErrorCategory::Auth,
            AblyError::Network { .. } => ErrorCategory::Network,
            AblyError::Decode { .. } => ErrorCategory::Decode,
            AblyError::Api { code, .. } => ErrorCategory::from_code(*code),
        }
    }

    /// Whether the failure is an authentication or configuration error
    /// raised by this crate rather than passed through from the transport
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            AblyError::Configuration { .. } | AblyError::Authentication { .. }
        )
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AblyError::Network { retryable, .. } => *retryable,
            AblyError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AblyError::Configuration { message, .. }
            | AblyError::Authentication { message, .. }
            | AblyError::Network { message, .. }
            | AblyError::Api { message, .. }
            | AblyError::Decode { message, .. } => message,
        }
    }
}

impl From<serde_json::Error> for AblyError {
    fn from(err: serde_json::Error) -> Self {
        AblyError::Decode {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Auth,
    Network,
    Decode,
    BadRequest,
    Forbidden,
    NotFound,
    RateLimit,
    Internal,
    Unknown,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            40000..=40099 => ErrorCategory::BadRequest,
            40100..=40199 => ErrorCategory::Auth,
            40300..=40399 => ErrorCategory::Forbidden,
            40400..=40499 => ErrorCategory::NotFound,
            42900..=42999 => ErrorCategory::RateLimit,
            50000..=50099 => ErrorCategory::Internal,
            _ => ErrorCategory::Unknown,
        }
    }
}
