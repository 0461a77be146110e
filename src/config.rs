//! Configuration for the built-in pagination styles
//!
//! Bounds and defaults used when building the built-in params specs.
//! Configuration can be loaded from YAML or JSON.

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Defaults and bounds for the built-in params
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Default `size` for page/size pagination
    pub default_page_size: u64,

    /// Upper bound for `size` in page/size pagination
    pub max_page_size: u64,

    /// Default `limit` for limit/offset pagination
    pub default_limit: u64,

    /// Upper bound for `limit` in limit/offset pagination
    pub max_limit: u64,

    /// Default `size` for cursor pagination
    pub default_cursor_size: u64,

    /// Optional upper bound for `size` in cursor pagination
    pub max_cursor_size: Option<u64>,

    /// Whether offset styles count the total by default
    pub include_total: bool,

    /// Whether cursor pagination counts the total by default
    pub cursor_include_total: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
            default_limit: 50,
            max_limit: 100,
            default_cursor_size: 50,
            max_cursor_size: None,
            include_total: true,
            cursor_include_total: false,
        }
    }
}

impl PaginationConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, picking the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    /// Set the default page size
    #[must_use]
    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the maximum page size
    #[must_use]
    pub fn with_max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = size;
        self
    }

    /// Set the default limit
    #[must_use]
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the maximum limit
    #[must_use]
    pub fn with_max_limit(mut self, limit: u64) -> Self {
        self.max_limit = limit;
        self
    }

    /// Set the default cursor size
    #[must_use]
    pub fn with_default_cursor_size(mut self, size: u64) -> Self {
        self.default_cursor_size = size;
        self
    }

    /// Check that defaults sit inside their bounds
    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(Error::config("max_page_size must be at least 1"));
        }
        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            return Err(Error::config(format!(
                "default_page_size {} must be between 1 and {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.max_limit == 0 {
            return Err(Error::config("max_limit must be at least 1"));
        }
        if !(1..=self.max_limit).contains(&self.default_limit) {
            return Err(Error::config(format!(
                "default_limit {} must be between 1 and {}",
                self.default_limit, self.max_limit
            )));
        }
        if let Some(max) = self.max_cursor_size {
            if self.default_cursor_size > max {
                return Err(Error::config(format!(
                    "default_cursor_size {} exceeds max_cursor_size {max}",
                    self.default_cursor_size
                )));
            }
        }
        Ok(())
    }
}
