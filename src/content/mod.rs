//! Content module - posts, front-matter, rendering and queries

mod frontmatter;
pub mod markdown;
mod post;
pub mod reading_time;
pub mod repository;
pub mod search;
pub mod source;

pub use frontmatter::{FrontMatter, Metadata};
pub use markdown::{MarkdownRenderer, RenderError, Renderer};
pub use post::Post;
pub use repository::{Repository, TagCount};
pub use source::{ContentSource, FsSource, MemorySource};
