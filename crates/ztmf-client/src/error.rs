//! Error types for the ZTMF client, and how each failure is recovered from.

use std::collections::BTreeMap;

/// User-facing messages shown when a request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessages {
    pub login: &'static str,
    pub expired: &'static str,
    pub not_saved: &'static str,
    pub error: &'static str,
}

pub const ERROR_MESSAGES: ErrorMessages = ErrorMessages {
    login: "Please log in to continue.",
    expired: "Your session has expired. Please log in again.",
    not_saved: "Your changes were not saved. Your session may have expired. Please log in again.",
    error: "An error occurred. Please log in and try again. If the error persists, please contact support.",
};

/// All errors that can occur when talking to the ZTMF backend.
#[derive(Debug, thiserror::Error)]
pub enum ZtmfError {
    /// Unusable client configuration.
    #[error("ztmf config error: {0}")]
    Config(String),

    /// The backend rejected the input (400). `fields` maps field keys to
    /// the backend's message for each.
    #[error("ztmf validation error: {message}")]
    Validation {
        fields: BTreeMap<String, String>,
        message: String,
    },

    /// Session missing, expired, or not allowed (401/403).
    #[error("ztmf auth error {status}: {message}")]
    Auth { status: u16, message: String },

    /// Resource does not exist (404).
    #[error("ztmf not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response.
    #[error("ztmf API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("ztmf request timed out")]
    Timeout,

    #[error("ztmf network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ztmf json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bearer token could not be decoded.
    #[error("ztmf token error: {0}")]
    Token(String),

    /// The owning [`RequestScope`](crate::RequestScope) was cancelled.
    #[error("request cancelled")]
    Cancelled,
}

/// Coarse failure class a caller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    AuthExpired,
    NotFound,
    NetworkOrUnknown,
}

/// What the caller should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Show per-field helper text and stay on the form.
    FieldErrors(BTreeMap<String, String>),
    /// Send the user to sign in, with this message.
    SignIn(&'static str),
    /// Show the message in place.
    Inline(String),
}

impl ZtmfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Auth { .. } | Self::Token(_) => ErrorKind::AuthExpired,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Config(_)
            | Self::Api { .. }
            | Self::Timeout
            | Self::Network(_)
            | Self::Json(_)
            | Self::Cancelled => ErrorKind::NetworkOrUnknown,
        }
    }

    /// Unknown failures fall back to signing in again.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Validation { fields, .. } => Recovery::FieldErrors(fields.clone()),
            Self::NotFound(message) => Recovery::Inline(message.clone()),
            _ if self.kind() == ErrorKind::AuthExpired => Recovery::SignIn(ERROR_MESSAGES.expired),
            _ => Recovery::SignIn(ERROR_MESSAGES.error),
        }
    }

    /// HTTP status for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Auth { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_ask_to_sign_in_again() {
        let err = ZtmfError::Auth {
            status: 403,
            message: "forbidden".to_owned(),
        };
        assert_eq!(err.kind(), ErrorKind::AuthExpired);
        assert_eq!(err.recovery(), Recovery::SignIn(ERROR_MESSAGES.expired));
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn validation_keeps_field_map() {
        let mut fields = BTreeMap::new();
        fields.insert("issoemail".to_owned(), "bad".to_owned());
        let err = ZtmfError::Validation {
            fields: fields.clone(),
            message: "Invalid request".to_owned(),
        };
        assert_eq!(err.recovery(), Recovery::FieldErrors(fields));
    }

    #[test]
    fn unknown_failures_fall_back_to_generic_sign_in() {
        for err in [
            ZtmfError::Timeout,
            ZtmfError::Api {
                status: 500,
                message: "boom".to_owned(),
            },
            ZtmfError::Cancelled,
        ] {
            assert_eq!(err.kind(), ErrorKind::NetworkOrUnknown);
            assert_eq!(err.recovery(), Recovery::SignIn(ERROR_MESSAGES.error));
        }
    }

    #[test]
    fn not_found_is_shown_inline() {
        let err = ZtmfError::NotFound("/fismasystems/9".to_owned());
        assert_eq!(err.recovery(), Recovery::Inline("/fismasystems/9".to_owned()));
    }
}
