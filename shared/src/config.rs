//! Runtime configuration handed to the core by the shell.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::{
    AppError, ErrorKind, DEFAULT_API_BASE, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS,
    SIDEBAR_STORAGE_KEY,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base '{base}': {reason}")]
    InvalidApiBase { base: String, reason: String },

    #[error("page size options cannot be empty")]
    NoPageSizes,

    #[error("page size must be positive")]
    ZeroPageSize,

    #[error("default page size {0} is not one of the selectable sizes")]
    DefaultNotSelectable(usize),

    #[error("storage key cannot be empty")]
    EmptyStorageKey,

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

/// Dashboard settings.
///
/// `api_base` is the absolute origin the backend is served from; every API
/// path is joined onto it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base: String,
    pub default_page_size: usize,
    pub page_size_options: Vec<usize>,
    pub sidebar_storage_key: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            sidebar_storage_key: SIDEBAR_STORAGE_KEY.to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.api_base).map_err(|e| ConfigError::InvalidApiBase {
            base: self.api_base.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidApiBase {
                base: self.api_base.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidApiBase {
                base: self.api_base.clone(),
                reason: "query and fragment are not allowed".to_string(),
            });
        }

        if self.page_size_options.is_empty() {
            return Err(ConfigError::NoPageSizes);
        }
        if self.default_page_size == 0 || self.page_size_options.contains(&0) {
            return Err(ConfigError::ZeroPageSize);
        }
        if !self.page_size_options.contains(&self.default_page_size) {
            return Err(ConfigError::DefaultNotSelectable(self.default_page_size));
        }
        if self.sidebar_storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }

        Ok(())
    }

    /// Joins an absolute API path (`/api/...`) onto the configured base.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{base}{path}")
    }
}
