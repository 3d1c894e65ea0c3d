use serde::{Deserialize, Serialize};
use thiserror::Error;

use crux_http::Http;

use crate::config::DashboardConfig;
use crate::event::Event;
use crate::gateway::{ApiRequest, GatewayReply};

pub type HttpCapability = Http<Event>;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    #[must_use]
    pub const fn has_request_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpError {
    #[error("{method} requests cannot carry a body")]
    BodyNotAllowed { method: &'static str },

    #[error("request body of {size} bytes exceeds maximum of {max}")]
    BodyTooLarge { size: usize, max: usize },

    #[error("URL exceeds maximum length of {max} bytes")]
    UrlTooLong { max: usize },
}

/// Correlates a core log line with the backend's access log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn check(request: &ApiRequest, url: &str) -> Result<(), HttpError> {
    if url.len() > MAX_URL_LENGTH {
        return Err(HttpError::UrlTooLong {
            max: MAX_URL_LENGTH,
        });
    }
    if let Some(body) = &request.body {
        if !request.method.has_request_body() {
            return Err(HttpError::BodyNotAllowed {
                method: request.method.as_str(),
            });
        }
        if body.len() > MAX_REQUEST_BODY_SIZE {
            return Err(HttpError::BodyTooLarge {
                size: body.len(),
                max: MAX_REQUEST_BODY_SIZE,
            });
        }
    }
    Ok(())
}

/// Hands `request` to the shell. The reply, success or not, comes back as
/// the event built by `make_event`.
pub fn send<F>(
    http: &HttpCapability,
    config: &DashboardConfig,
    request: ApiRequest,
    make_event: F,
) -> Result<RequestId, HttpError>
where
    F: FnOnce(GatewayReply) -> Event + Send + 'static,
{
    let url = config.endpoint(&request.path);
    check(&request, &url)?;

    let request_id = RequestId::new();
    tracing::debug!(
        method = request.method.as_str(),
        url = %url,
        request_id = %request_id,
        "sending request"
    );

    let builder = match request.method {
        HttpMethod::Get => http.get(&url),
        HttpMethod::Post => http.post(&url),
        HttpMethod::Put => http.put(&url),
        HttpMethod::Delete => http.delete(&url),
    }
    .header(REQUEST_ID_HEADER, request_id.as_str());

    let builder = match request.body {
        Some(body) => builder.header("Content-Type", "application/json").body(body),
        None => builder,
    };

    let logged_id = request_id.clone();
    builder.send(move |result| {
        let reply = GatewayReply::from_http(result);
        match &reply {
            GatewayReply::Response { status, .. } => {
                tracing::debug!(request_id = %logged_id, status, "response received");
            }
            GatewayReply::Transport { message } => {
                tracing::error!(request_id = %logged_id, error = %message, "request failed");
            }
        }
        make_event(reply)
    });

    Ok(request_id)
}
