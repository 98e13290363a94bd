//! Blog configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{ContentError, Result};

/// Main blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // Site
    pub title: String,
    pub author: String,

    // Content
    /// Directory holding one `<slug>.md` file per post, relative to the base dir
    pub content_dir: String,
    /// URL prefix for cover images
    pub images_root: String,
    /// Extension of the conventional cover image when a post declares none
    pub default_image_ext: String,

    // Listings
    pub recent_limit: usize,
    pub trending_window: usize,
    pub trending_top: usize,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub server: ServerConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            author: String::new(),

            content_dir: "content/posts".to_string(),
            images_root: "/images/posts".to_string(),
            default_image_ext: "svg".to_string(),

            recent_limit: 10,
            trending_window: 10,
            trending_top: 10,

            highlight: HighlightConfig::default(),
            server: ServerConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ContentError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text; an empty document yields defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: BlogConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Conventional cover image for a post that declares none
    pub fn default_cover_image(&self, slug: &str) -> String {
        format!(
            "{}/{}.{}",
            self.images_root.trim_end_matches('/'),
            slug,
            self.default_image_ext.trim_start_matches('.')
        )
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_numbers: bool,
    /// Guess the language from the first line when a fence declares none
    pub auto_detect: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_numbers: false,
            auto_detect: true,
        }
    }
}

/// Query server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}
