//! Substring search and tag filtering over posts

use std::collections::BTreeSet;

use super::Post;

/// Filter posts by a free-text query, preserving input order.
///
/// A blank query returns every post. Otherwise a post matches when the
/// trimmed, lower-cased query is a substring of its title, excerpt, any tag
/// or its markdown body.
pub fn search<'a, I>(posts: I, query: &str) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return posts.into_iter().collect();
    }

    posts
        .into_iter()
        .filter(|post| matches(post, &query))
        .collect()
}

fn matches(post: &Post, query: &str) -> bool {
    post.title.to_lowercase().contains(query)
        || post.excerpt.to_lowercase().contains(query)
        || post.tags.iter().any(|tag| tag.to_lowercase().contains(query))
        || post.content.to_lowercase().contains(query)
}

/// Keep posts carrying `tag` (exact, case-insensitive); a blank tag keeps all
pub fn filter_by_tag<'a, I>(posts: I, tag: &str) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    if tag.is_empty() {
        return posts.into_iter().collect();
    }
    posts.into_iter().filter(|post| post.has_tag(tag)).collect()
}

/// Every distinct tag across `posts`, sorted
pub fn all_tags<'a, I>(posts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Post>,
{
    posts
        .into_iter()
        .flat_map(|post| post.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
