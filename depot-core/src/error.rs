//! Error taxonomy shared by every client operation.
//!
//! Errors keep the HTTP status code of the failed response so callers can
//! branch on the kind of failure without parsing strings:
//!
//! ```
//! use depot_core::error::ClientError;
//!
//! let err = ClientError::from_status(401, "Access denied");
//! assert!(err.is_auth_error());
//! assert_eq!(err.status_code(), Some(401));
//! assert_eq!(err.user_message(), "Access denied");
//! ```

/// Message shown when no response was received at all.
pub const CONNECTION_FAILED_MESSAGE: &str = "Could not connect to the server.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally before any request was sent
    #[error("{0}")]
    Validation(String),

    /// No credential is available for an authenticated call
    #[error("Not logged in")]
    NotAuthenticated,

    /// 401/403 response from an authenticated call
    #[error("HTTP {status}: {message}")]
    Auth { status: u16, message: String },

    /// Any other non-2xx response
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// Network-level failure, no response received
    #[error("Network error: {0}")]
    Transport(reqwest::Error),

    /// A 2xx response whose body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Local persistence failed (credential store, saved downloads)
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

impl ClientError {
    /// Classify a non-2xx status code
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 401 || status == 403 {
            Self::Auth { status, message }
        } else {
            Self::Server { status, message }
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is an authentication/authorization error (401 or 403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Auth { .. } | Self::NotAuthenticated)
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if no response was received
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Text suitable for the message area or a toast.
    ///
    /// Server-provided text is passed through untouched, transport failures
    /// collapse into a generic connection message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::NotAuthenticated => "Please log in first.".to_string(),
            Self::Auth { message, .. } | Self::Server { message, .. } => message.clone(),
            Self::Transport(_) => CONNECTION_FAILED_MESSAGE.to_string(),
            Self::Parse(_) => "The server sent an unexpected response.".to_string(),
            Self::Storage(e) => format!("Local storage failed: {}", e),
        }
    }
}
