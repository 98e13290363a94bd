//! List tags

use anyhow::Result;

use crate::content::search::all_tags;
use crate::Blog;

/// Print trending tags over the newest `window` posts, or every tag with `all`
pub fn run(blog: &Blog, window: Option<i64>, all: bool) -> Result<()> {
    let repo = blog.load()?;

    if all {
        let tags = all_tags(repo.get_all());
        println!("Tags ({}):", tags.len());
        for tag in tags {
            println!("  {}", tag);
        }
        return Ok(());
    }

    let trending = repo.get_trending_tags(window);
    println!("Trending tags ({}):", trending.len());
    for entry in trending {
        println!("  {} ({})", entry.tag, entry.count);
    }
    Ok(())
}
