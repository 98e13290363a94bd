//! Show a single post

use anyhow::Result;

use crate::content::{Post, Repository};
use crate::error::ContentError;
use crate::helpers::{display_date, post_path, tag_path};
use crate::Blog;

/// Print a post's metadata, and its rendered body when `html` is set
pub fn run(blog: &Blog, slug: &str, html: bool) -> Result<()> {
    let repo = blog.load()?;
    print!("{}", format_post(&repo, slug, html)?);
    Ok(())
}

/// Metadata and, when asked for, the rendered body.
///
/// A body that fails to render is reported and skipped; the metadata is
/// still returned.
pub fn format_post(repo: &Repository, slug: &str, html: bool) -> Result<String> {
    let post = repo.require(slug)?;
    let mut out = format_details(post);

    if html {
        match repo.get_with_html(slug) {
            Ok(Some(rendered)) => {
                out.push('\n');
                out.push_str(&rendered.html_content.unwrap_or_default());
            }
            Ok(None) => {
                return Err(ContentError::NotFound {
                    slug: slug.to_string(),
                }
                .into())
            }
            Err(e) => {
                tracing::warn!("{}", e);
                out.push_str("\n(body could not be rendered)\n");
            }
        }
    }

    Ok(out)
}

/// Metadata block for a post
pub fn format_details(post: &Post) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", post.title));
    out.push_str(&format!("  Path:    {}\n", post_path(&post.slug)));
    if !post.date.is_empty() {
        out.push_str(&format!("  Date:    {}\n", display_date(&post.date)));
    }
    if let Some(author) = &post.author {
        out.push_str(&format!("  Author:  {}\n", author));
    }
    out.push_str(&format!("  Reading: {}\n", post.reading_time()));
    out.push_str(&format!("  Cover:   {}\n", post.cover_image));
    if !post.tags.is_empty() {
        let tags: Vec<String> = post
            .tags
            .iter()
            .map(|tag| format!("{} ({})", tag, tag_path(tag)))
            .collect();
        out.push_str(&format!("  Tags:    {}\n", tags.join(", ")));
    }
    if !post.excerpt.is_empty() {
        out.push_str(&format!("\n  {}\n", post.excerpt));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use crate::content::markdown::FailingRenderer;
    use crate::content::MemorySource;
    use std::sync::Arc;

    fn source() -> MemorySource {
        MemorySource::new().with_document("note", "---\ntitle: Note\n---\nSome *text*.\n")
    }

    #[test]
    fn test_format_post_with_html() {
        let repo = Repository::load(&source(), &BlogConfig::default()).unwrap();
        let out = format_post(&repo, "note", true).unwrap();
        assert!(out.starts_with("Note\n"));
        assert!(out.ends_with("\n<p>Some <em>text</em>.</p>\n"));

        let out = format_post(&repo, "note", false).unwrap();
        assert!(!out.contains("<p>"));
        assert!(format_post(&repo, "other", true).is_err());
    }

    #[test]
    fn test_render_failure_still_shows_metadata() {
        let repo = Repository::load_with_renderer(
            &source(),
            &BlogConfig::default(),
            Arc::new(FailingRenderer),
        )
        .unwrap();
        let out = format_post(&repo, "note", true).unwrap();
        assert!(out.starts_with("Note\n"));
        assert!(out.ends_with("\n(body could not be rendered)\n"));
    }

    #[test]
    fn test_format_details() {
        let post = Post::from_document(
            "intro",
            "---\ntitle: Intro\ndate: 2024-03-09\nauthor: Sam\ntags: [c++]\nexcerpt: Hi there.\n---\nBody",
            &BlogConfig::default(),
        );
        let details = format_details(&post);
        assert!(details.starts_with("Intro\n"));
        assert!(details.contains("  Path:    /posts/intro\n"));
        assert!(details.contains("  Date:    March 9, 2024\n"));
        assert!(details.contains("  Author:  Sam\n"));
        assert!(details.contains("  Cover:   /images/posts/intro.svg\n"));
        assert!(details.contains("  Tags:    c++ (/posts?tag=c%2B%2B)\n"));
        assert!(details.ends_with("\n  Hi there.\n"));
    }
}
