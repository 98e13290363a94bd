//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters a URI component may keep unescaped
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encode a value for use inside a URL query or path segment
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Path of a post page
///
/// # Examples
/// ```ignore
/// post_path("hello-world") // -> "/posts/hello-world"
/// ```
pub fn post_path(slug: &str) -> String {
    format!("/posts/{}", encode_component(slug))
}

/// Listing path filtered by a tag
///
/// # Examples
/// ```ignore
/// tag_path("c++") // -> "/posts?tag=c%2B%2B"
/// ```
pub fn tag_path(tag: &str) -> String {
    format!("/posts?tag={}", encode_component(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("rust"), "rust");
        assert_eq!(encode_component("c++ & go"), "c%2B%2B%20%26%20go");
        assert_eq!(encode_component("it's (fine)"), "it's%20(fine)");
        assert_eq!(encode_component("日本"), "%E6%97%A5%E6%9C%AC");
    }

    #[test]
    fn test_paths() {
        assert_eq!(post_path("hello-world"), "/posts/hello-world");
        assert_eq!(tag_path("c++"), "/posts?tag=c%2B%2B");
    }
}
