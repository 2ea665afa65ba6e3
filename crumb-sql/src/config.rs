//! Page-size policy, loadable from TOML.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::InvalidSortParameter;

/// Failure to load a [`PagingConfig`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this config.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values are inconsistent.
    #[error("invalid paging config: {0}")]
    Invalid(String),
}

/// Page-size bounds applied at the request boundary.
///
/// The engine fetches whatever page size it is given; this policy is what
/// turns an optional client `size` into that number.
///
/// ```
/// use crumb_sql::PagingConfig;
///
/// let config = PagingConfig::from_toml_str("max_page_size = 50").unwrap();
/// assert_eq!(config.default_page_size, 20);
/// assert_eq!(config.page_size(None).unwrap(), 20);
/// assert_eq!(config.page_size(Some(500)).unwrap(), 50);
/// assert!(config.page_size(Some(0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct PagingConfig {
    /// Page size when the client sends none.
    pub default_page_size: u32,
    /// Largest page a client may request; larger requests are clamped.
    pub max_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl PagingConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check that `1 <= default_page_size <= max_page_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }

    /// Effective page size for a client request.
    ///
    /// Absent means the default, zero is rejected, anything above the
    /// maximum is clamped to it.
    pub fn page_size(&self, requested: Option<u32>) -> Result<usize, InvalidSortParameter> {
        let size = match requested {
            None => self.default_page_size,
            Some(0) => return Err(InvalidSortParameter::new("page size must be at least 1")),
            Some(n) => n.min(self.max_page_size),
        };
        Ok(size as usize)
    }
}
