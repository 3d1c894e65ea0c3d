// lib.rs - Complaint desk shared core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod export;
pub mod filter;
pub mod gateway;
pub mod metrics;
pub mod model;
pub mod pagination;
pub mod render;
pub mod validation;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::DashboardConfig;
pub use event::{Event, ListKind, Password};
pub use model::{Admin, Complaint, ComplaintId, ComplaintStatus, Model};
pub use view::ViewModel;
pub use crux_core::{render::Render, App as CruxApp};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const BOOTSTRAP_ADMIN: &str = "admin";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_OPTIONS: &[usize] = &[5, 10, 25, 50];
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const SIDEBAR_STORAGE_KEY: &str = "sidebarCollapsed";
pub const UNANSWERED_COMMENT_LABEL: &str = "None";
pub const SYSTEM_LABEL: &str = "System";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Rejected,
    Serialization,
    Deserialization,
    Configuration,
    InvalidState,
    Internal,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Rejected => "REJECTED",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Configuration => "CONFIG_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Rejected,
            401 => Self::Authentication,
            403 => Self::Authorization,
            404 => Self::NotFound,
            409 => Self::Conflict,
            500..=599 => Self::Internal,
            _ => Self::Unknown,
        }
    }
}

/// The single error value the model keeps for display.
///
/// Nothing is retried automatically; every failure ends the user action that
/// triggered it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Text for the blocking alert.
    ///
    /// Validation and server-supplied messages are shown verbatim; everything
    /// else gets a generic sentence so transport details stay in the logs.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Authentication | ErrorKind::Authorization if self.is_server_text() => {
                self.message.clone()
            }
            ErrorKind::Validation
            | ErrorKind::Rejected
            | ErrorKind::Conflict
            | ErrorKind::NotFound
            | ErrorKind::Configuration => self.message.clone(),
            ErrorKind::Network => {
                "Unable to reach the server. Please check your connection and try again.".into()
            }
            ErrorKind::Authentication => "Your session has expired. Please sign in again.".into(),
            ErrorKind::Authorization => {
                "You don't have permission to perform this action.".into()
            }
            ErrorKind::Serialization | ErrorKind::Deserialization => {
                "The server sent data the dashboard could not read. Please try again.".into()
            }
            ErrorKind::InvalidState => "That action is not available right now.".into(),
            ErrorKind::Internal | ErrorKind::Unknown => {
                if self.message.is_empty() {
                    "An unexpected error occurred. Please try again.".into()
                } else {
                    self.message.clone()
                }
            }
        }
    }

    /// Builds an error from a non-2xx reply, preferring the `detail` the API
    /// puts in error bodies and falling back to `message`.
    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = ErrorKind::from_http_status(status);

        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(ApiErrorResponse::into_message)
            .unwrap_or_else(|| status_fallback(status));

        Self::new(kind, message).with_context("http_status", status.to_string())
    }

    /// True when `message` came back from the API rather than being a
    /// placeholder for an empty error body.
    fn is_server_text(&self) -> bool {
        self.context
            .get("http_status")
            .and_then(|s| s.parse::<u16>().ok())
            .is_some_and(|status| self.message != status_fallback(status))
    }
}

fn status_fallback(status: u16) -> String {
    format!("HTTP error: {status}")
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        self.detail
            .or(self.error)
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Current calendar date on the local clock, as the shell's user sees it.
#[must_use]
pub fn local_today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_error_codes_are_stable() {
            assert_eq!(ErrorKind::Network.code(), "NETWORK_ERROR");
            assert_eq!(ErrorKind::Validation.code(), "VALIDATION_ERROR");
            assert_eq!(ErrorKind::Rejected.code(), "REJECTED");
        }

        #[test]
        fn test_from_http_status_prefers_detail() {
            let body = br#"{"detail": "Admin already exists", "message": "ignored"}"#;
            let err = AppError::from_http_status(400, Some(body));
            assert_eq!(err.kind, ErrorKind::Rejected);
            assert_eq!(err.message, "Admin already exists");
            assert_eq!(err.context.get("http_status").map(String::as_str), Some("400"));
        }

        #[test]
        fn test_from_http_status_falls_back_to_message() {
            let body = br#"{"message": "Cannot delete"}"#;
            let err = AppError::from_http_status(403, Some(body));
            assert_eq!(err.kind, ErrorKind::Authorization);
            assert_eq!(err.message, "Cannot delete");
        }

        #[test]
        fn test_from_http_status_without_body() {
            let err = AppError::from_http_status(502, None);
            assert_eq!(err.kind, ErrorKind::Internal);
            assert_eq!(err.message, "HTTP error: 502");
        }

        #[test]
        fn test_from_http_status_with_garbage_body() {
            let err = AppError::from_http_status(404, Some(b"<html>nope</html>"));
            assert_eq!(err.kind, ErrorKind::NotFound);
            assert_eq!(err.message, "HTTP error: 404");
        }

        #[test]
        fn test_user_facing_message_hides_transport_details() {
            let err = AppError::new(ErrorKind::Network, "dns failure on api.local");
            assert!(!err.user_facing_message().contains("dns"));

            let err = AppError::new(ErrorKind::Validation, "Please enter a username");
            assert_eq!(err.user_facing_message(), "Please enter a username");
        }

        #[test]
        fn test_server_detail_shown_for_auth_statuses() {
            let body = br#"{"detail": "Cannot delete the bootstrap admin"}"#;
            let err = AppError::from_http_status(403, Some(body));
            assert_eq!(err.user_facing_message(), "Cannot delete the bootstrap admin");

            let err = AppError::from_http_status(401, None);
            assert_eq!(
                err.user_facing_message(),
                "Your session has expired. Please sign in again."
            );

            let err =
                AppError::new(ErrorKind::Authorization, "Admin management requires a super admin");
            assert_eq!(
                err.user_facing_message(),
                "You don't have permission to perform this action."
            );
        }

        #[test]
        fn test_display_includes_code() {
            let err = AppError::new(ErrorKind::Rejected, "nope");
            assert_eq!(err.to_string(), "[REJECTED] nope");
        }
    }
}
