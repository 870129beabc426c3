//! Classification of the unconsumed suffix
//!
//! Each pattern is anchored at the start of the suffix, so a heading further
//! down the buffer can never be picked ahead of the text sitting at the cursor.

use super::token::TokenKind;
use regex::Regex;
use std::sync::OnceLock;

/// Result of classifying the text at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub kind: TokenKind,
    /// Offset of the heading marker relative to the start of the suffix
    pub marker_at: usize,
}

struct Patterns {
    title: Regex,
    chapter: Regex,
    section: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        title: Regex::new(r"\A\n*# ").expect("title pattern is valid"),
        chapter: Regex::new(r"\A\n*## ").expect("chapter pattern is valid"),
        section: Regex::new(r"\A\n*### ").expect("section pattern is valid"),
    })
}

/// Classify `rest` as title, chapter or section, tried in that order
///
/// Leading blank lines before a marker are skipped; `marker_at` points past
/// them.
///
/// # Returns
/// * `Some(Classified)` - A heading marker starts the suffix
/// * `None` - Nothing recognizable yet (incomplete marker or stray text)
pub fn classify(rest: &str) -> Option<Classified> {
    let p = patterns();
    let candidates = [
        (TokenKind::Title, &p.title),
        (TokenKind::Chapter, &p.chapter),
        (TokenKind::Section, &p.section),
    ];

    candidates.into_iter().find_map(|(kind, pattern)| {
        pattern.find(rest).map(|m| Classified {
            kind,
            marker_at: m.end() - kind.marker().len(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(rest: &str) -> Option<TokenKind> {
        classify(rest).map(|c| c.kind)
    }

    #[test]
    fn test_each_heading_level() {
        assert_eq!(kind("# Title"), Some(TokenKind::Title));
        assert_eq!(kind("## Chapter"), Some(TokenKind::Chapter));
        assert_eq!(kind("### Section"), Some(TokenKind::Section));
    }

    #[test]
    fn test_marker_needs_trailing_space() {
        assert_eq!(kind("#"), None);
        assert_eq!(kind("##"), None);
        assert_eq!(kind("###"), None);
        assert_eq!(kind("#### Deep"), None);
        assert_eq!(kind("#Title"), None);
    }

    #[test]
    fn test_leading_newlines_are_skipped() {
        let c = classify("\n\n## A\n").unwrap();
        assert_eq!(c.kind, TokenKind::Chapter);
        assert_eq!(c.marker_at, 2);

        let c = classify("\n### S\nbody\n").unwrap();
        assert_eq!(c.kind, TokenKind::Section);
        assert_eq!(c.marker_at, 1);
    }

    #[test]
    fn test_matching_is_anchored() {
        assert_eq!(kind("intro text\n## A\n"), None);
        assert_eq!(kind(" ## A\n"), None);
        // a section at the cursor wins over a chapter further down
        assert_eq!(kind("### S\nbody\n\n## B\n"), Some(TokenKind::Section));
    }

    #[test]
    fn test_empty_suffix() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("\n\n"), None);
    }
}
