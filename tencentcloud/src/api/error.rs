use thiserror::Error;

/// Error codes TencentCloud documents as transient. A code matches when it
/// equals one of these or extends it with a `.` suffix.
const RETRYABLE_CODES: &[&str] = &[
    "InternalError",
    "RequestLimitExceeded",
    "ResourceInUse",
    "ResourceBusy",
    "ResourceUnavailable",
    "ResourceInsufficient",
    "TradeUnknownError",
];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("[TencentCloudSDKError] Code={code}, Message={message}, RequestId={request_id}")]
    Service {
        code: String,
        message: String,
        request_id: String,
    },

    #[error("API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Remote error code, only present for errors reported inside a response envelope
    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Transient failures are worth another attempt; everything else is an
    /// application-level rejection and surfaces immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RequestError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Timeout(_) => true,
            ApiError::Http { status, .. } => *status == 429 || *status >= 500,
            ApiError::Service { code, .. } => RETRYABLE_CODES.iter().any(|c| {
                code == c
                    || code
                        .strip_prefix(c)
                        .is_some_and(|rest| rest.starts_with('.'))
            }),
            ApiError::ParseError(_) | ApiError::Config(_) | ApiError::Cancelled => false,
        }
    }

    /// Lookup by id of an object the API no longer knows about
    pub fn is_not_found(&self) -> bool {
        match self.code() {
            Some(code) => {
                code.starts_with("ResourceNotFound")
                    || code.ends_with("NotFound")
                    || code.ends_with("NotExist")
            }
            None => false,
        }
    }
}
