//! Reading-time estimation

/// Roughly 200 words per minute at about 5 characters per word
pub const CHARS_PER_MINUTE: usize = 1000;

/// Estimated minutes to read `content`, never less than 1
pub fn estimate(content: &str) -> usize {
    content.chars().count().div_ceil(CHARS_PER_MINUTE).max(1)
}

/// Render a minute count as "1 min read" / "N min read"
pub fn format(minutes: usize) -> String {
    if minutes == 1 {
        "1 min read".to_string()
    } else {
        format!("{} min read", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_floors_at_one() {
        assert_eq!(estimate(""), 1);
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(estimate(&"a".repeat(1000)), 1);
        assert_eq!(estimate(&"a".repeat(1001)), 2);
        assert_eq!(estimate(&"a".repeat(2500)), 3);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 1000 three-byte characters
        assert_eq!(estimate(&"语".repeat(1000)), 1);
    }

    #[test]
    fn test_format() {
        assert_eq!(format(1), "1 min read");
        assert_eq!(format(4), "4 min read");
    }
}
