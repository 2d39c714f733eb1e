//! Caption title helpers
//!
//! The first line of a caption is treated as the post's title:
//! - Display names are chosen from titles
//! - The review sheet shows a truncated title as its preview

/// Maximum number of characters shown in a caption preview.
pub const PREVIEW_CHARS: usize = 100;

/// First line of a caption, trimmed. None when the caption is empty or its
/// first line is blank.
pub fn first_line(caption: &str) -> Option<&str> {
    let line = caption.split('\n').next().unwrap_or("").trim();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Title truncated to `PREVIEW_CHARS` characters (not bytes).
pub fn caption_preview(caption: &str) -> String {
    caption
        .split('\n')
        .next()
        .unwrap_or("")
        .chars()
        .take(PREVIEW_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("  P.willinckii  \nsecond"), Some("P.willinckii"));
        assert_eq!(first_line("\nsecond"), None);
        assert_eq!(first_line(""), None);
        assert_eq!(first_line("single"), Some("single"));
    }

    #[test]
    fn test_caption_preview_counts_characters() {
        let long = "ビ".repeat(150);
        assert_eq!(caption_preview(&long).chars().count(), PREVIEW_CHARS);
        assert_eq!(caption_preview("title\nbody"), "title");
    }
}
