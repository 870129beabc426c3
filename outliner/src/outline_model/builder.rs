//! Document tree builder
//!
//! Applies recognized tokens to the outline tree. The tree lives behind an
//! `Arc`: every mutation goes through `Arc::make_mut`, so a snapshot a consumer
//! is still holding is copied before it is changed, and only the last chapter
//! is copied when a section lands in it. A token that changes nothing hands
//! back the very same `Arc`.

use super::document::{Chapter, Document, Section};
use super::ids::{IdSource, UuidIds};
use crate::stream_parser::Token;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What to do when a second title line is recognized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitlePolicy {
    /// Every title line overwrites the previous title
    #[default]
    LastWins,
    /// Only the first non-empty title is kept
    FirstWins,
}

/// Single writer for one outline tree
pub struct OutlineBuilder {
    document: Arc<Document>,
    ids: Box<dyn IdSource>,
    title_policy: TitlePolicy,
}

impl OutlineBuilder {
    /// Create a builder with random identifiers and the default title policy
    pub fn new() -> Self {
        Self::with_ids(Box::new(UuidIds), TitlePolicy::default())
    }

    /// Create a builder drawing identifiers from `ids`
    ///
    /// # Parameters
    /// * `ids` - Source of identifiers for the document and every node
    /// * `title_policy` - How repeated title lines are resolved
    pub fn with_ids(mut ids: Box<dyn IdSource>, title_policy: TitlePolicy) -> Self {
        let document = Arc::new(Document::new(ids.next_id()));
        Self {
            document,
            ids,
            title_policy,
        }
    }

    /// Current snapshot of the tree
    pub fn snapshot(&self) -> Arc<Document> {
        Arc::clone(&self.document)
    }

    /// Apply one token and return the resulting snapshot
    pub fn apply(&mut self, token: Token) -> Arc<Document> {
        match token {
            Token::Title(text) => self.apply_title(&text),
            Token::Chapter(text) => self.apply_chapter(&text),
            Token::Section { heading, body } => self.apply_section(&heading, &body),
        }
    }

    /// Set the document title according to the title policy
    pub fn apply_title(&mut self, text: &str) -> Arc<Document> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("Discarding title heading with empty text");
            return self.snapshot();
        }
        let keep_existing =
            self.title_policy == TitlePolicy::FirstWins && !self.document.title.is_empty();
        if keep_existing {
            log::debug!("Ignoring repeated title '{}'", text);
            return self.snapshot();
        }
        if self.document.title != text {
            Arc::make_mut(&mut self.document).title = text.to_string();
            log::debug!("Document title set to '{}'", text);
        }
        self.snapshot()
    }

    /// Append a chapter; an empty title leaves the tree untouched
    pub fn apply_chapter(&mut self, text: &str) -> Arc<Document> {
        let title = text.trim();
        if title.is_empty() {
            log::debug!("Discarding chapter heading with empty title");
            return self.snapshot();
        }

        let chapter = Chapter {
            id: self.ids.next_id(),
            title: title.to_string(),
            sections: Vec::new(),
            is_complete: false,
        };
        log::debug!("Chapter {} '{}'", self.document.chapters.len() + 1, title);
        Arc::make_mut(&mut self.document)
            .chapters
            .push(Arc::new(chapter));
        self.snapshot()
    }

    /// Append a section to the last chapter
    ///
    /// Sections with an empty title, or arriving before any chapter, are dropped.
    pub fn apply_section(&mut self, text: &str, body: &str) -> Arc<Document> {
        let title = text.trim();
        if title.is_empty() {
            log::debug!("Discarding section heading with empty title");
            return self.snapshot();
        }
        if self.document.chapters.is_empty() {
            log::warn!("Dropping section '{}': no chapter to attach it to", title);
            return self.snapshot();
        }

        let section = Section {
            id: self.ids.next_id(),
            title: title.to_string(),
            content: body.trim().to_string(),
            is_complete: false,
        };

        let document = Arc::make_mut(&mut self.document);
        if let Some(last) = document.chapters.last_mut() {
            log::debug!("Section '{}' under chapter '{}'", title, last.title);
            Arc::make_mut(last).sections.push(section);
        }
        self.snapshot()
    }
}

impl Default for OutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline_model::SequentialIds;

    fn builder(policy: TitlePolicy) -> OutlineBuilder {
        OutlineBuilder::with_ids(Box::new(SequentialIds::new("t")), policy)
    }

    #[test]
    fn test_chapter_and_section_ids_are_fresh() {
        let mut b = builder(TitlePolicy::LastWins);
        b.apply_chapter("Intro");
        let doc = b.apply_section("Motivation", "Why");

        assert_eq!(doc.id, "t-1");
        assert_eq!(doc.chapters[0].id, "t-2");
        assert_eq!(doc.chapters[0].sections[0].id, "t-3");
        assert!(!doc.chapters[0].is_complete);
        assert!(!doc.chapters[0].sections[0].is_complete);
    }

    #[test]
    fn test_titles_are_trimmed_and_empty_rejected() {
        let mut b = builder(TitlePolicy::LastWins);
        let before = b.snapshot();

        let after = b.apply_chapter("   ");
        assert!(Arc::ptr_eq(&before, &after));

        let doc = b.apply_chapter("  Methods \t");
        assert_eq!(doc.chapter_titles(), vec!["Methods"]);

        let before = b.snapshot();
        let after = b.apply_section(" ", "body");
        assert!(Arc::ptr_eq(&before, &after));

        let doc = b.apply_section(" Design ", "  one line  ");
        assert_eq!(doc.chapters[0].sections[0].title, "Design");
        assert_eq!(doc.chapters[0].sections[0].content, "one line");
    }

    #[test]
    fn test_orphan_section_is_dropped() {
        let mut b = builder(TitlePolicy::LastWins);
        let before = b.snapshot();
        let after = b.apply_section("Lonely", "body");
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.section_count(), 0);
    }

    #[test]
    fn test_sections_attach_to_last_chapter() {
        let mut b = builder(TitlePolicy::LastWins);
        b.apply_chapter("A");
        b.apply_chapter("B");
        b.apply_section("S1", "one");
        let doc = b.apply_section("S2", "two");

        assert!(doc.chapters[0].sections.is_empty());
        assert_eq!(doc.chapters[1].section_titles(), vec!["S1", "S2"]);
    }

    #[test]
    fn test_held_snapshot_is_never_mutated() {
        let mut b = builder(TitlePolicy::LastWins);
        b.apply_chapter("A");
        b.apply_chapter("B");
        let held = b.snapshot();

        let doc = b.apply_section("S", "body");

        assert_eq!(held.section_count(), 0);
        assert_eq!(doc.section_count(), 1);
        // untouched chapter is shared, the mutated one was copied
        assert!(Arc::ptr_eq(&held.chapters[0], &doc.chapters[0]));
        assert!(!Arc::ptr_eq(&held.chapters[1], &doc.chapters[1]));
    }

    #[test]
    fn test_title_last_wins() {
        let mut b = builder(TitlePolicy::LastWins);
        b.apply_title("First");
        let doc = b.apply_title("Second");
        assert_eq!(doc.title, "Second");

        let after = b.apply_title("  ");
        assert!(Arc::ptr_eq(&doc, &after));
        assert_eq!(after.title, "Second");
    }

    #[test]
    fn test_title_first_wins() {
        let mut b = builder(TitlePolicy::FirstWins);
        b.apply_title("");
        b.apply_title("First");
        let doc = b.apply_title("Second");
        assert_eq!(doc.title, "First");
    }

    #[test]
    fn test_apply_dispatches_on_token() {
        let mut b = builder(TitlePolicy::LastWins);
        b.apply(Token::Title("Paper".to_string()));
        b.apply(Token::Chapter("Intro".to_string()));
        let doc = b.apply(Token::Section {
            heading: "Scope".to_string(),
            body: "Narrow".to_string(),
        });

        assert_eq!(doc.title, "Paper");
        assert_eq!(doc.chapters[0].sections[0].content, "Narrow");
    }
}
