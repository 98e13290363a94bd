//! Rendered HTML cache
//!
//! Memoizes rendered post bodies keyed by slug. Each entry remembers the hash
//! of the markdown it was rendered from, so a rebuilt snapshot with changed
//! content is re-rendered instead of served stale.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::content::{Post, Repository};
use crate::error::Result;

/// A cached render of one post
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Hash of the markdown body the HTML came from
    content_hash: u64,
    html: String,
}

/// Slug-keyed memo of rendered HTML, shared between requests
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same contract as [`Repository::get_with_html`], reusing earlier renders
    pub fn get_with_html(&self, repo: &Repository, slug: &str) -> Result<Option<Post>> {
        let Some(post) = repo.get_by_slug(slug) else {
            return Ok(None);
        };

        let content_hash = hash_content(&post.content);
        if let Some(html) = self.lookup(slug, content_hash) {
            tracing::debug!(slug, "Render cache hit");
            return Ok(Some(post.with_html(html)));
        }

        let html = repo.render(post)?;
        self.store(slug, content_hash, html.clone());
        Ok(Some(post.with_html(html)))
    }

    /// Drop entries for slugs that are no longer in `repo`
    pub fn retain_posts_of(&self, repo: &Repository) {
        self.lock().retain(|slug, _| repo.get_by_slug(slug).is_some());
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, slug: &str, content_hash: u64) -> Option<String> {
        self.lock()
            .get(slug)
            .filter(|entry| entry.content_hash == content_hash)
            .map(|entry| entry.html.clone())
    }

    fn store(&self, slug: &str, content_hash: u64, html: String) {
        self.lock()
            .insert(slug.to_string(), CacheEntry { content_hash, html });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic mid-insert leaves at worst a missing entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Calculate a hash for post content
pub fn hash_content(content: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use crate::content::MemorySource;

    fn repo(body: &str) -> Repository {
        let source = MemorySource::new().with_document("post", &format!("---\ntitle: T\n---\n{}", body));
        Repository::load(&source, &BlogConfig::default()).unwrap()
    }

    #[test]
    fn test_hash_content() {
        assert_eq!(hash_content("hello"), hash_content("hello"));
        assert_ne!(hash_content("hello"), hash_content("world"));
    }

    #[test]
    fn test_caches_render() {
        let cache = RenderCache::new();
        let repo = repo("first *version*");

        let post = cache.get_with_html(&repo, "post").unwrap().unwrap();
        assert!(post.html_content.unwrap().contains("<em>version</em>"));
        assert_eq!(cache.len(), 1);

        let again = cache.get_with_html(&repo, "post").unwrap().unwrap();
        assert!(again.html_content.is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_content_is_rerendered() {
        let cache = RenderCache::new();
        cache.get_with_html(&repo("old body"), "post").unwrap();

        let post = cache.get_with_html(&repo("new body"), "post").unwrap().unwrap();
        assert_eq!(post.html_content.as_deref(), Some("<p>new body</p>\n"));
    }

    #[test]
    fn test_removed_posts_are_evicted() {
        let cache = RenderCache::new();
        let source = MemorySource::new()
            .with_document("kept", "---\ntitle: K\n---\nk")
            .with_document("gone", "---\ntitle: G\n---\ng");
        let before = Repository::load(&source, &BlogConfig::default()).unwrap();
        cache.get_with_html(&before, "kept").unwrap();
        cache.get_with_html(&before, "gone").unwrap();
        assert_eq!(cache.len(), 2);

        let after = Repository::load(
            &MemorySource::new().with_document("kept", "---\ntitle: K\n---\nk"),
            &BlogConfig::default(),
        )
        .unwrap();
        cache.retain_posts_of(&after);
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup("kept", hash_content("k")).is_some());
    }

    #[test]
    fn test_missing_slug_is_not_cached() {
        let cache = RenderCache::new();
        assert!(cache.get_with_html(&repo("x"), "other").unwrap().is_none());
        assert!(cache.is_empty());

        cache.get_with_html(&repo("x"), "post").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
