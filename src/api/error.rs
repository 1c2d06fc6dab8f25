//! Errors raised by library server calls
//!
//! Every remote failure ends up as an [`ApiError`]. Mutation code turns it
//! into a user notice through [`ApiError::user_message`]; it never reaches
//! the read model.

use thiserror::Error;

/// Library server errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-success status
    #[error("Server returned {status}{}", detail_suffix(.detail.as_deref()))]
    Status { status: u16, detail: Option<String> },

    /// The response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The client refused to send the request
    #[error("Request rejected: {0}")]
    Rejected(String),
}

fn detail_suffix(detail: Option<&str>) -> String {
    detail.map(|d| format!(": {d}")).unwrap_or_default()
}

impl ApiError {
    /// Status error without a server-provided detail
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::Status {
            status,
            detail: None,
        }
    }

    /// Text suitable for a transient notice
    ///
    /// A detail sent by the server always wins over the generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Status { status, .. } => match status {
                400 => "Invalid request parameters".to_string(),
                401 => "Authentication failed, please sign in again".to_string(),
                403 => "You do not have permission to do this".to_string(),
                404 => "The requested resource was not found".to_string(),
                500 | 502 | 503 | 504 => {
                    "Internal server error, please try again later".to_string()
                }
                other => format!("An error occurred ({other})"),
            },
            Self::Network(_) | Self::Timeout => {
                "Network timeout, please check your connection".to_string()
            }
            Self::Decode(_) => "Unexpected response from the server".to_string(),
            Self::Rejected(reason) => reason.clone(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
