//! Streaming outline parser
//!
//! Turns the cumulative text of a streamed Markdown outline into an outline
//! tree, one call per received fragment:
//! 1. **Scanning**: the [`OutlineScanner`] extracts complete headings from the
//!    unconsumed part of the buffer
//! 2. **Building**: each token is applied to the tree by the
//!    [`OutlineBuilder`], which publishes an immutable snapshot

use crate::outline_config::OutlinerConfig;
use crate::outline_model::{Document, IdSource, OutlineBuilder, UuidIds};
use std::sync::Arc;

mod classify;
mod scanner;
mod token;

pub use classify::{classify, Classified};
pub use scanner::OutlineScanner;
pub use token::{Token, TokenKind};

/// Scanner and tree builder for one outline-generation request
pub struct OutlineParser {
    scanner: OutlineScanner,
    builder: OutlineBuilder,
    tokens_seen: usize,
}

impl OutlineParser {
    /// Create a parser with default settings and random identifiers
    pub fn new() -> Self {
        Self::from_parts(OutlineScanner::new(), OutlineBuilder::new())
    }

    /// Create a parser configured from `outliner.toml` settings
    pub fn from_config(config: &OutlinerConfig) -> Self {
        Self::with_ids(config, Box::new(UuidIds))
    }

    /// Create a parser with an explicit identifier source
    ///
    /// # Parameters
    /// * `config` - Scanner offset and title policy
    /// * `ids` - Identifier source for the document and its nodes
    pub fn with_ids(config: &OutlinerConfig, ids: Box<dyn IdSource>) -> Self {
        Self::from_parts(
            OutlineScanner::with_offset(config.scanner.initial_offset),
            OutlineBuilder::with_ids(ids, config.outline.title_policy),
        )
    }

    fn from_parts(scanner: OutlineScanner, builder: OutlineBuilder) -> Self {
        Self {
            scanner,
            builder,
            tokens_seen: 0,
        }
    }

    /// Feed the cumulative text received so far
    ///
    /// # Returns
    /// * `Arc<Document>` - Snapshot after applying every newly completed token;
    ///   the same `Arc` as before when nothing changed
    pub fn feed(&mut self, text: &str) -> Arc<Document> {
        for token in self.scanner.feed(text) {
            self.tokens_seen += 1;
            log::trace!("Token {}: {:?}", self.tokens_seen, token.kind());
            self.builder.apply(token);
        }
        self.builder.snapshot()
    }

    /// Current snapshot of the tree
    pub fn document(&self) -> Arc<Document> {
        self.builder.snapshot()
    }

    /// Byte offset of the first unconsumed character
    pub fn cursor(&self) -> usize {
        self.scanner.cursor()
    }

    /// Text seen so far
    pub fn buffer(&self) -> &str {
        self.scanner.buffer()
    }

    /// Number of tokens extracted so far, including discarded ones
    pub fn tokens_seen(&self) -> usize {
        self.tokens_seen
    }
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete outline in one call
pub fn parse_outline(text: &str) -> Arc<Document> {
    OutlineParser::new().feed(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline_model::{SequentialIds, TitlePolicy};

    #[test]
    fn test_feed_applies_tokens_in_order() {
        let mut parser =
            OutlineParser::with_ids(&OutlinerConfig::default(), Box::new(SequentialIds::new("p")));
        let doc = parser.feed("# T\n\n## A\n### S\nbody\n\n");

        assert_eq!(doc.title, "T");
        assert_eq!(doc.chapter_titles(), vec!["A"]);
        assert_eq!(doc.chapters[0].sections[0].content, "body");
        assert_eq!(parser.tokens_seen(), 3);
        assert_eq!(parser.cursor(), parser.buffer().len() - 1);
    }

    #[test]
    fn test_configured_offset_and_policy() {
        let mut config = OutlinerConfig::default();
        config.scanner.initial_offset = 4;
        config.outline.title_policy = TitlePolicy::FirstWins;

        let mut parser = OutlineParser::from_config(&config);
        let doc = parser.feed("```\n# One\n\n# Two\n\n");
        assert_eq!(doc.title, "One");
    }

    #[test]
    fn test_parse_outline_helper() {
        let doc = parse_outline("## A\n## B\n");
        assert_eq!(doc.chapter_titles(), vec!["A", "B"]);
    }
}
