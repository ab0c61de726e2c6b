// Ably error codes used by the authentication core
// Codes and HTTP statuses follow the Ably REST error catalogue

use super::{AblyError, ErrorCategory};

/// Ably protocol error codes relevant to authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AblyErrorCode {
    // 400xx Client errors
    BadRequest = 40000,
    InvalidRequestBody = 40001,
    InvalidParameterValue = 40003,

    // 401xx Authentication errors
    Unauthorized = 40100,
    InvalidCredentials = 40101,
    IncompatibleCredentials = 40102,
    InvalidUseOfBasicAuthOverHttp = 40103,
    TokenExpired = 40142,
    NoAuthenticationMeans = 40160,
    ErrorFromClientTokenCallback = 40170,
    NoMeansToRenewToken = 40171,

    // 403xx Authorization errors
    Forbidden = 40300,

    // 404xx Not found errors
    NotFound = 40400,

    // 429xx Rate limiting
    TooManyRequests = 42900,

    // 500xx Server errors
    InternalServerError = 50000,
    TimeoutError = 50003,
    RequestFailed = 50004,
}

impl AblyErrorCode {
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            40000 => Some(Self::BadRequest),
            40001 => Some(Self::InvalidRequestBody),
            40003 => Some(Self::InvalidParameterValue),

            40100 => Some(Self::Unauthorized),
            40101 => Some(Self::InvalidCredentials),
            40102 => Some(Self::IncompatibleCredentials),
            40103 => Some(Self::InvalidUseOfBasicAuthOverHttp),
            40142 => Some(Self::TokenExpired),
            40160 => Some(Self::NoAuthenticationMeans),
            40170 => Some(Self::ErrorFromClientTokenCallback),
            40171 => Some(Self::NoMeansToRenewToken),

            40300 => Some(Self::Forbidden),
            40400 => Some(Self::NotFound),
            42900 => Some(Self::TooManyRequests),

            50000 => Some(Self::InternalServerError),
            50003 => Some(Self::TimeoutError),
            50004 => Some(Self::RequestFailed),

            _ => None,
        }
    }

    /// HTTP status Ably pairs with this code
    pub fn http_status(&self) -> u16 {
        match self.to_u16() {
            40000..=40099 => 400,
            40100..=40199 => 401,
            40300..=40399 => 403,
            40400..=40499 => 404,
            42900..=42999 => 429,
            _ => 500,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.to_u16())
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::InvalidRequestBody => "Invalid request body",
            Self::InvalidParameterValue => "Invalid parameter value",

            Self::Unauthorized => "Unauthorized",
            Self::InvalidCredentials => "Invalid credentials",
            Self::IncompatibleCredentials => "Incompatible credentials",
            Self::InvalidUseOfBasicAuthOverHttp => "Invalid use of Basic auth over non-TLS transport",
            Self::TokenExpired => "Token expired",
            Self::NoAuthenticationMeans => "No authentication options provided",
            Self::ErrorFromClientTokenCallback => "Error in requesting auth token",
            Self::NoMeansToRenewToken => "No means provided to renew auth token",

            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::TooManyRequests => "Too many requests",

            Self::InternalServerError => "Internal server error",
            Self::TimeoutError => "Timeout error",
            Self::RequestFailed => "Request failed",
        }
    }
}

/// Convert HTTP status codes to Ably error codes
pub fn http_to_ably_code(status: u16) -> AblyErrorCode {
    match status {
        400 => AblyErrorCode::BadRequest,
        401 => AblyErrorCode::Unauthorized,
        403 => AblyErrorCode::Forbidden,
        404 => AblyErrorCode::NotFound,
        429 => AblyErrorCode::TooManyRequests,
        500 => AblyErrorCode::InternalServerError,
        502..=504 => AblyErrorCode::RequestFailed,
        _ => AblyErrorCode::BadRequest,
    }
}

/// Parse an error response body returned alongside a non-2xx status
pub fn parse_ably_error(status: u16, body: &str) -> AblyError {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = json.get("error") {
            let code = error
                .get("code")
                .and_then(|c| c.as_u64())
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or_else(|| http_to_ably_code(status).to_u16());

            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_else(|| {
                    AblyErrorCode::from_u16(code)
                        .map(|c| c.default_message())
                        .unwrap_or("Unknown error")
                })
                .to_string();

            return AblyError::Api { status, code, message };
        }
    }

    let code = http_to_ably_code(status);
    let message = if body.trim().is_empty() {
        code.default_message().to_string()
    } else {
        body.trim().to_string()
    };
    AblyError::Api {
        status,
        code: code.to_u16(),
        message,
    }
}
