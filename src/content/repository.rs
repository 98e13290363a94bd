//! Post repository: the read-only catalog of every loaded post

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

use super::source::ContentSource;
use super::{MarkdownRenderer, Post, Renderer};
use crate::config::BlogConfig;
use crate::error::{ContentError, Result};

/// A tag and how many posts in the sampled window carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Immutable snapshot of all posts.
///
/// Built once from a [`ContentSource`] and never mutated; when content
/// changes a new snapshot is loaded and swapped in as a whole.
pub struct Repository {
    /// Newest first; equal dates keep source enumeration order
    posts: Vec<Post>,
    /// Slugs in source enumeration order
    slugs: Vec<String>,
    index: HashMap<String, usize>,
    renderer: Arc<dyn Renderer>,
    recent_limit: usize,
    trending_window: usize,
    trending_top: usize,
}

impl Repository {
    /// Load every post from `source`, with a renderer built from `config`
    pub fn load<S: ContentSource + ?Sized>(source: &S, config: &BlogConfig) -> Result<Self> {
        let renderer = Arc::new(MarkdownRenderer::with_options(&config.highlight));
        Self::load_with_renderer(source, config, renderer)
    }

    /// Load every post from `source`, sharing an existing renderer.
    ///
    /// Any read failure aborts the load: a partial catalog would skew
    /// recency and trending tags.
    pub fn load_with_renderer<S: ContentSource + ?Sized>(
        source: &S,
        config: &BlogConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self> {
        let slugs = source.list_slugs()?;
        let mut posts = Vec::with_capacity(slugs.len());

        for slug in &slugs {
            let raw = source.read(slug)?.ok_or_else(|| ContentError::Io {
                slug: slug.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "listed post disappeared"),
            })?;
            let post = Post::from_document(slug, &raw, config);
            tracing::debug!(slug = %post.slug, date = %post.date, "Loaded post");
            posts.push(post);
        }

        let repository = Self::from_posts(posts, config, renderer);
        tracing::info!("Loaded {} posts", repository.len());
        Ok(repository)
    }

    /// Build a snapshot from posts given in enumeration order
    pub fn from_posts(posts: Vec<Post>, config: &BlogConfig, renderer: Arc<dyn Renderer>) -> Self {
        let mut seen = HashSet::with_capacity(posts.len());
        let mut slugs = Vec::with_capacity(posts.len());
        let mut unique = Vec::with_capacity(posts.len());
        for post in posts {
            if !seen.insert(post.slug.clone()) {
                tracing::warn!(slug = %post.slug, "Duplicate slug, keeping the first post");
                continue;
            }
            slugs.push(post.slug.clone());
            unique.push(post);
        }

        // Lexical ISO-8601 comparison; the sort is stable so ties keep load order
        unique.sort_by(|a, b| b.date.cmp(&a.date));

        let index = unique
            .iter()
            .enumerate()
            .map(|(i, post)| (post.slug.clone(), i))
            .collect();

        Self {
            posts: unique,
            slugs,
            index,
            renderer,
            recent_limit: config.recent_limit,
            trending_window: config.trending_window,
            trending_top: config.trending_top,
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Every slug, in source enumeration order
    pub fn list_slugs(&self) -> &[String] {
        &self.slugs
    }

    /// Exact, case-sensitive slug lookup
    pub fn get_by_slug(&self, slug: &str) -> Option<&Post> {
        self.index.get(slug).map(|&i| &self.posts[i])
    }

    /// Like [`Self::get_by_slug`], with a `NotFound` error for absent slugs
    pub fn require(&self, slug: &str) -> Result<&Post> {
        self.get_by_slug(slug).ok_or_else(|| ContentError::NotFound {
            slug: slug.to_string(),
        })
    }

    /// All posts, newest first
    pub fn get_all(&self) -> &[Post] {
        &self.posts
    }

    /// The newest `limit` posts (configured default when `None`); zero or
    /// negative limits give nothing
    pub fn get_recent(&self, limit: Option<i64>) -> &[Post] {
        let limit = limit.unwrap_or(self.recent_limit as i64);
        if limit <= 0 {
            return &[];
        }
        let end = usize::try_from(limit).unwrap_or(usize::MAX).min(self.posts.len());
        &self.posts[..end]
    }

    /// Tag frequencies over the newest `sample_size` posts.
    ///
    /// Sorted by count descending, ties in first-seen order, at most the
    /// configured top-N entries. Duplicate tags on one post count twice.
    pub fn get_trending_tags(&self, sample_size: Option<i64>) -> Vec<TagCount> {
        let window = sample_size.unwrap_or(self.trending_window as i64);

        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for post in self.get_recent(Some(window)) {
            for tag in &post.tags {
                *counts.entry(tag.as_str()).or_insert(0) += 1;
            }
        }

        let mut trending: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect();
        trending.sort_by(|a, b| b.count.cmp(&a.count));
        trending.truncate(self.trending_top);
        trending
    }

    /// Render a post's body to HTML
    pub fn render(&self, post: &Post) -> Result<String> {
        self.renderer.render(&post.content).map_err(|e| {
            tracing::warn!(slug = %post.slug, stage = %e.stage, "Render failed: {}", e.message);
            ContentError::Render {
                slug: post.slug.clone(),
                stage: e.stage,
                message: e.message,
            }
        })
    }

    /// Post with `html_content` filled in.
    ///
    /// `Ok(None)` when the slug does not exist, whatever the renderer would
    /// have done; `Err(Render)` when it exists but its body failed to render.
    /// The stored post is never modified.
    pub fn get_with_html(&self, slug: &str) -> Result<Option<Post>> {
        let Some(post) = self.get_by_slug(slug) else {
            return Ok(None);
        };
        let html = self.render(post)?;
        Ok(Some(post.with_html(html)))
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }
}
