//! List posts

use anyhow::Result;

use crate::content::Post;
use crate::helpers::display_date;
use crate::Blog;

/// List every post, newest first
pub fn run(blog: &Blog) -> Result<()> {
    let repo = blog.load()?;
    let posts: Vec<&Post> = repo.get_all().iter().collect();
    println!("Posts ({}):", posts.len());
    print!("{}", format_posts(&posts));
    Ok(())
}

/// List the newest `limit` posts (configured default when `None`)
pub fn recent(blog: &Blog, limit: Option<i64>) -> Result<()> {
    let repo = blog.load()?;
    let posts: Vec<&Post> = repo.get_recent(limit).iter().collect();
    println!("Recent posts ({}):", posts.len());
    print!("{}", format_posts(&posts));
    Ok(())
}

/// One line per post: date, title, slug and reading time
pub fn format_posts(posts: &[&Post]) -> String {
    posts
        .iter()
        .map(|post| format!("  {}\n", format_post_line(post)))
        .collect()
}

pub fn format_post_line(post: &Post) -> String {
    let date = if post.date.is_empty() {
        "undated".to_string()
    } else {
        display_date(&post.date)
    };
    format!(
        "{} - {} [{}] ({})",
        date,
        post.title,
        post.slug,
        post.reading_time()
    )
}
