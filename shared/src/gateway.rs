//! Remote gateway: the JSON-over-HTTP calls the dashboard makes and the
//! interpretation of their replies.
//!
//! Requests are plain data here; `capabilities::http` hands them to the
//! shell.

use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::capabilities::http::HttpMethod;
use crate::event::Password;
use crate::model::{ComplaintId, ComplaintStatus};
use crate::{ApiErrorResponse, AppError, ErrorKind};

/// Characters escaped in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub const COMPLAINTS_PATH: &str = "/api/complaints";
pub const ADMINS_PATH: &str = "/api/admins";
pub const CHECK_SUPER_PATH: &str = "/api/admins/check-super";
pub const UPDATE_PASSWORD_PATH: &str = "/api/admins/update-password";
pub const CHAT_COMPLAINT_PATH: &str = "/submit_complaint";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("could not read response: {0}")]
    Decode(String),

    #[error("could not encode request: {0}")]
    Encode(String),
}

impl GatewayError {
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Transport { message } => AppError::new(ErrorKind::Network, message),
            GatewayError::Rejected { status, message } => {
                let kind = if (200..300).contains(&status) {
                    ErrorKind::Rejected
                } else {
                    ErrorKind::from_http_status(status)
                };
                AppError::new(kind, message).with_context("http_status", status.to_string())
            }
            GatewayError::Decode(message) => AppError::new(ErrorKind::Deserialization, message),
            GatewayError::Encode(message) => AppError::new(ErrorKind::Serialization, message),
        }
    }
}

/// One outgoing call. `path` is relative to the configured API base.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Vec<u8>>,
}

// Bodies may carry passwords.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

impl ApiRequest {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            body: None,
        }
    }

    fn with_json<T: Serialize>(
        method: HttpMethod,
        path: impl Into<String>,
        body: &T,
    ) -> Result<Self, GatewayError> {
        let body = serde_json::to_vec(body).map_err(|e| GatewayError::Encode(e.to_string()))?;
        Ok(Self {
            method,
            path: path.into(),
            body: Some(body),
        })
    }
}

#[must_use]
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

// --- Request builders ---

#[must_use]
pub fn list_complaints() -> ApiRequest {
    ApiRequest::get(COMPLAINTS_PATH)
}

#[derive(Serialize)]
struct ComplaintUpdateBody<'a> {
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "Admin_Comment")]
    admin_comment: &'a str,
}

pub fn update_complaint(
    id: &ComplaintId,
    status: &ComplaintStatus,
    comment: &str,
) -> Result<ApiRequest, GatewayError> {
    ApiRequest::with_json(
        HttpMethod::Put,
        format!("{COMPLAINTS_PATH}/{}", encode_segment(id.as_str())),
        &ComplaintUpdateBody {
            status: status.label(),
            admin_comment: comment,
        },
    )
}

#[must_use]
pub fn list_admins() -> ApiRequest {
    ApiRequest::get(ADMINS_PATH)
}

#[must_use]
pub fn check_super_admin() -> ApiRequest {
    ApiRequest::get(CHECK_SUPER_PATH)
}

#[derive(Serialize)]
struct NewAdminBody<'a> {
    username: &'a str,
    password: &'a str,
}

pub fn create_admin(username: &str, password: &Password) -> Result<ApiRequest, GatewayError> {
    ApiRequest::with_json(
        HttpMethod::Post,
        ADMINS_PATH,
        &NewAdminBody {
            username,
            password: password.0.expose_secret(),
        },
    )
}

#[must_use]
pub fn delete_admin(username: &str) -> ApiRequest {
    ApiRequest::delete(format!("{ADMINS_PATH}/{}", encode_segment(username)))
}

#[derive(Serialize)]
struct PasswordChangeBody<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

pub fn update_password(current: &Password, new: &Password) -> Result<ApiRequest, GatewayError> {
    ApiRequest::with_json(
        HttpMethod::Put,
        UPDATE_PASSWORD_PATH,
        &PasswordChangeBody {
            current_password: current.0.expose_secret(),
            new_password: new.0.expose_secret(),
        },
    )
}

#[derive(Serialize)]
struct ChatComplaintBody<'a> {
    #[serde(rename = "Patient_Name")]
    patient_name: &'a str,
    #[serde(rename = "Complaint_Type")]
    complaint_type: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Date_Submitted")]
    date_submitted: String,
}

pub fn submit_chat_complaint(
    patient_name: &str,
    complaint_type: &str,
    description: &str,
    date: NaiveDate,
) -> Result<ApiRequest, GatewayError> {
    ApiRequest::with_json(
        HttpMethod::Post,
        CHAT_COMPLAINT_PATH,
        &ChatComplaintBody {
            patient_name,
            complaint_type,
            description,
            date_submitted: date.format(crate::DATE_FORMAT).to_string(),
        },
    )
}

// --- Replies ---

/// What came back for a request, reduced to what the core needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayReply {
    Response { status: u16, body: Vec<u8> },
    Transport { message: String },
}

impl GatewayReply {
    #[must_use]
    pub fn ok_json<T: Serialize>(value: &T) -> Self {
        Self::Response {
            status: 200,
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// `crux_http` reports 4xx/5xx as `HttpError::Http`; those keep their
    /// status and body so the server's `detail` reaches the alert.
    pub fn from_http(result: crux_http::Result<crux_http::Response<Vec<u8>>>) -> Self {
        match result {
            Ok(mut response) => Self::Response {
                status: u16::from(response.status()),
                body: response.take_body().unwrap_or_default(),
            },
            Err(crux_http::HttpError::Http { code, body, .. }) => Self::Response {
                status: u16::from(code),
                body: body.unwrap_or_default(),
            },
            Err(e) => Self::Transport {
                message: e.to_string(),
            },
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    /// The body of a 2xx reply; the server's error text otherwise.
    fn into_success_body(self) -> Result<(u16, Vec<u8>), GatewayError> {
        match self {
            Self::Transport { message } => Err(GatewayError::Transport { message }),
            Self::Response { status, body } if (200..300).contains(&status) => Ok((status, body)),
            Self::Response { status, body } => {
                let message = AppError::from_http_status(status, Some(&body)).message;
                Err(GatewayError::Rejected { status, message })
            }
        }
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        let (_, body) = self.into_success_body()?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// Outcome of a write. A 2xx body with only `detail`/`error` and no
    /// `message` is a failure; a 2xx with neither yields `fallback`.
    pub fn into_message(self, fallback: &str) -> Result<String, GatewayError> {
        let (status, body) = self.into_success_body()?;
        let reply: MessageReply = if body.iter().all(u8::is_ascii_whitespace) {
            MessageReply::default()
        } else {
            serde_json::from_slice(&body).map_err(|e| GatewayError::Decode(e.to_string()))?
        };

        if let Some(message) = reply.message.filter(|m| !m.trim().is_empty()) {
            return Ok(message);
        }
        let error = ApiErrorResponse {
            detail: reply.detail,
            error: reply.error,
            message: None,
        };
        match error.into_message() {
            Some(message) => Err(GatewayError::Rejected { status, message }),
            None => Ok(fallback.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MessageReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReply {
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "fulfillmentText", default)]
    pub fulfillment_text: String,
}
