//! Content sources: where raw post documents come from

use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ContentError, Result};

/// A collection of raw documents addressed by slug
pub trait ContentSource {
    /// Every available slug, in the source's enumeration order
    fn list_slugs(&self) -> Result<Vec<String>>;

    /// Raw document text for `slug`, `None` when it does not exist
    fn read(&self, slug: &str) -> Result<Option<String>>;
}

/// A flat directory of `<slug>.md` files
#[derive(Debug, Clone)]
pub struct FsSource {
    dir: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unavailable(&self, source: io::Error) -> ContentError {
        ContentError::SourceUnavailable {
            path: self.dir.clone(),
            source,
        }
    }
}

impl ContentSource for FsSource {
    /// Slugs sorted by file name, so enumeration order is stable across platforms
    fn list_slugs(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Err(self.unavailable(io::Error::new(
                io::ErrorKind::NotFound,
                "content directory does not exist",
            )));
        }

        let mut slugs = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| self.unavailable(io::Error::from(e)))?;
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if is_safe_slug(stem) => slugs.push(stem.to_string()),
                _ => tracing::warn!("Skipping post with unusable file name: {:?}", path),
            }
        }

        Ok(slugs)
    }

    fn read(&self, slug: &str) -> Result<Option<String>> {
        if !is_safe_slug(slug) {
            return Ok(None);
        }

        let path = self.dir.join(format!("{}.md", slug));
        if !path.is_file() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| ContentError::Io {
                slug: slug.to_string(),
                source,
            })
    }
}

/// An in-memory catalog of documents, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: IndexMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, slug: &str, raw: &str) -> Self {
        self.insert(slug, raw);
        self
    }

    pub fn insert(&mut self, slug: &str, raw: &str) {
        self.documents.insert(slug.to_string(), raw.to_string());
    }
}

impl ContentSource for MemorySource {
    fn list_slugs(&self) -> Result<Vec<String>> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn read(&self, slug: &str) -> Result<Option<String>> {
        Ok(self.documents.get(slug).cloned())
    }
}

/// Check if a file is a markdown post
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md")
        .unwrap_or(false)
}

/// Slugs name files directly inside the content directory; listing and
/// reading share this rule
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\'])
}
