pub mod http;
pub mod kv;

pub use self::http::{HttpError, HttpMethod, RequestId};
pub use self::kv::{KvError, KvKey};

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::app::App;
use crate::event::Event;
use crate::{AppError, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Storage error: {0}")]
    Kv(#[from] KvError),
}

impl From<CapabilityError> for AppError {
    fn from(e: CapabilityError) -> Self {
        let kind = match e {
            CapabilityError::Http(_) => ErrorKind::InvalidState,
            CapabilityError::Kv(_) => ErrorKind::Configuration,
        };
        AppError::new(kind, e.to_string())
    }
}

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub render: Render<Event>,
}
