use crux_kv::KeyValue;
use thiserror::Error;

use crate::event::Event;

pub type KvCapability = KeyValue<Event>;

pub const MAX_KEY_LENGTH: usize = 512;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("stored value for '{key}' is not a JSON boolean")]
    NotABoolean { key: String },
}

/// A storage key the shell can use unchanged as a `localStorage` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KvKey(String);

impl KvKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(key: &str) -> Result<(), KvError> {
        let invalid = |reason: &str| KvError::InvalidKey {
            key: key.chars().take(50).collect(),
            reason: reason.to_string(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key cannot be empty"));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(invalid("key is too long"));
        }
        if key.chars().any(char::is_control) {
            return Err(invalid("key contains control characters"));
        }
        Ok(())
    }
}

/// `true`/`false` as JSON, the same text the browser shell writes.
#[must_use]
pub fn encode_flag(value: bool) -> Vec<u8> {
    if value {
        b"true".to_vec()
    } else {
        b"false".to_vec()
    }
}

pub fn decode_flag(key: &KvKey, bytes: &[u8]) -> Result<bool, KvError> {
    serde_json::from_slice(bytes).map_err(|_| KvError::NotABoolean {
        key: key.as_str().to_string(),
    })
}

/// Reads the stored sidebar flag. A missing key or failed read arrives as
/// `value: None`.
pub fn load_sidebar(kv: &KvCapability, key: &KvKey) {
    kv.get(key.as_str().to_string(), |result| {
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read sidebar preference");
                None
            }
        };
        Event::SidebarStateLoaded { value }
    });
}

pub fn store_sidebar(kv: &KvCapability, key: &KvKey, collapsed: bool) {
    kv.set(key.as_str().to_string(), encode_flag(collapsed), |result| {
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist sidebar preference");
        }
        Event::Noop
    });
}
