//! Helpers for presenting posts: display dates and listing links

mod date;
mod url;

pub use date::*;
pub use url::*;
