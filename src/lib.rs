//! folio: a small markdown blog engine
//!
//! Posts are markdown files with YAML front-matter. They are loaded once
//! into an immutable [`content::Repository`] snapshot that answers listing,
//! recency, trending-tag and search queries, and renders single posts to
//! HTML with figure captions and syntax highlighting.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{FsSource, Repository};

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Blog configuration
    pub config: config::BlogConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory of post markdown files
    pub content_dir: PathBuf,
}

impl Blog {
    /// Create a new blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::BlogConfig::load(&config_path)?
        } else {
            config::BlogConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a blog instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::BlogConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// The post source backing this blog
    pub fn source(&self) -> FsSource {
        FsSource::new(&self.content_dir)
    }

    /// Load a fresh snapshot of every post
    pub fn load(&self) -> Result<Repository> {
        Ok(Repository::load(&self.source(), &self.config)?)
    }
}
