//! Export the post catalog as JSON

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Blog;

/// Default catalog file name, relative to the base directory
pub const CATALOG_FILE: &str = "posts-data.json";

/// Write every post, newest first, as pretty JSON; returns the written path
pub fn run(blog: &Blog, output: Option<&Path>) -> Result<PathBuf> {
    let repo = blog.load()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| blog.base_dir.join(CATALOG_FILE));

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(repo.get_all())?;
    fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Exported {} posts to {:?}", repo.len(), output);
    Ok(output)
}
