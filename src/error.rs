//! Error taxonomy for the content pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a render failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Event stream to element tree
    Tree,
    Highlight,
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderStage::Tree => "tree",
            RenderStage::Highlight => "highlight",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading or rendering posts
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Post not found: {slug}")]
    NotFound { slug: String },

    #[error("Content source unavailable at {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read post {slug}: {source}")]
    Io {
        slug: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render post {slug} ({stage} stage): {message}")]
    Render {
        slug: String,
        stage: RenderStage,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl ContentError {
    /// Whether this error means the slug simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound { .. })
    }
}

pub type Result<T, E = ContentError> = std::result::Result<T, E>;
