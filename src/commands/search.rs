//! Search posts

use anyhow::Result;

use crate::commands::list::format_posts;
use crate::content::search::{filter_by_tag, search};
use crate::Blog;

/// Filter by tag (exact, case-insensitive), then by free-text query
pub fn run(blog: &Blog, query: &str, tag: Option<&str>) -> Result<()> {
    let repo = blog.load()?;
    let tag = tag.unwrap_or("");

    let tagged = filter_by_tag(repo.get_all(), tag);
    let found = search(tagged, query);

    println!("{}", summary(found.len(), tag, query));
    print!("{}", format_posts(&found));
    Ok(())
}

/// "3 posts found tagged "rust" matching "async""
pub fn summary(count: usize, tag: &str, query: &str) -> String {
    let mut line = format!("{} {} found", count, if count == 1 { "post" } else { "posts" });
    if !tag.is_empty() {
        line.push_str(&format!(" tagged \"{}\"", tag));
    }
    if !query.trim().is_empty() {
        line.push_str(&format!(" matching \"{}\"", query));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        assert_eq!(summary(1, "", ""), "1 post found");
        assert_eq!(
            summary(3, "rust", "async"),
            "3 posts found tagged \"rust\" matching \"async\""
        );
        assert_eq!(summary(0, "", "  "), "0 posts found");
    }
}
