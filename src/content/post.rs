//! Post model

use serde::{Deserialize, Serialize};

use super::frontmatter::FrontMatter;
use super::reading_time;
use crate::config::BlogConfig;

/// A blog post, immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier, the source file stem
    pub slug: String,

    pub title: String,

    /// ISO-8601 date as written in the front-matter; compared as a string
    pub date: String,

    pub tags: Vec<String>,

    pub excerpt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Declared `image`, or the conventional `<images_root>/<slug>.<ext>`
    pub cover_image: String,

    /// Raw markdown body
    pub content: String,

    /// Rendered body, only present on posts returned for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
}

impl Post {
    /// Build a post from a raw document.
    ///
    /// Missing or mistyped fields fall back to empty values; this never fails.
    pub fn from_document(slug: &str, raw: &str, config: &BlogConfig) -> Self {
        let (fm, body) = FrontMatter::parse(raw);
        Self::from_parts(slug, &fm, body, config)
    }

    /// Build a post from already extracted front-matter and body
    pub fn from_parts(slug: &str, fm: &FrontMatter, body: &str, config: &BlogConfig) -> Self {
        let cover_image = fm
            .get_str("image")
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| config.default_cover_image(slug));

        Self {
            slug: slug.to_string(),
            title: fm.get_str("title").unwrap_or_default(),
            date: fm.get_str("date").unwrap_or_default(),
            tags: fm.get_str_list("tags"),
            excerpt: fm.get_str("excerpt").unwrap_or_default(),
            author: fm.get_str("author").filter(|author| !author.is_empty()),
            cover_image,
            content: body.to_string(),
            html_content: None,
        }
    }

    /// Estimated reading time in minutes
    pub fn reading_minutes(&self) -> usize {
        reading_time::estimate(&self.content)
    }

    /// Reading time label such as "3 min read"
    pub fn reading_time(&self) -> String {
        reading_time::format(self.reading_minutes())
    }

    /// Exact, case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }

    /// Copy of this post carrying rendered HTML
    pub fn with_html(&self, html: String) -> Self {
        Self {
            html_content: Some(html),
            ..self.clone()
        }
    }
}
