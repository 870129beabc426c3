//! Document, chapter and section entities

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The outline being assembled for one generation request
///
/// Chapters are individually reference counted so that a snapshot handed to a
/// consumer keeps pointing at the chapters it saw, while the builder copies only
/// the chapter it mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Opaque identifier assigned at creation
    pub id: String,
    /// Document title, empty until a title line is seen
    pub title: String,
    /// Chapters in heading-encounter order
    pub chapters: Vec<Arc<Chapter>>,
}

/// A second-level heading and its sections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Opaque identifier
    pub id: String,
    /// Trimmed, never empty
    pub title: String,
    /// Sections in heading-encounter order
    pub sections: Vec<Section>,
    /// Owned by consumers; the parser always leaves it `false`
    pub is_complete: bool,
}

/// A third-level heading with its one-line body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Opaque identifier
    pub id: String,
    /// Trimmed, never empty
    pub title: String,
    /// Trimmed body line following the heading
    pub content: String,
    /// Owned by consumers; the parser always leaves it `false`
    pub is_complete: bool,
}

impl Document {
    /// Create an empty document with the given identifier
    pub fn new(id: String) -> Self {
        Self {
            id,
            title: String::new(),
            chapters: Vec::new(),
        }
    }

    /// Titles of all chapters, in order
    pub fn chapter_titles(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.title.as_str()).collect()
    }

    /// Total number of sections across all chapters
    pub fn section_count(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }

    /// Find the first chapter with the given title
    pub fn chapter(&self, title: &str) -> Option<&Chapter> {
        self.chapters
            .iter()
            .map(Arc::as_ref)
            .find(|c| c.title == title)
    }

    /// True when no title, chapter or section has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.chapters.is_empty()
    }
}

impl Chapter {
    /// Titles of all sections in this chapter, in order
    pub fn section_titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("doc-1".to_string());
        doc.title = "My Paper".to_string();
        doc.chapters.push(Arc::new(Chapter {
            id: "c-1".to_string(),
            title: "Intro".to_string(),
            sections: vec![Section {
                id: "s-1".to_string(),
                title: "Motivation".to_string(),
                content: "Why it matters".to_string(),
                is_complete: false,
            }],
            is_complete: false,
        }));
        doc
    }

    #[test]
    fn test_document_queries() {
        let doc = sample();
        assert_eq!(doc.chapter_titles(), vec!["Intro"]);
        assert_eq!(doc.section_count(), 1);
        assert_eq!(
            doc.chapter("Intro").map(Chapter::section_titles),
            Some(vec!["Motivation"])
        );
        assert!(doc.chapter("Missing").is_none());
        assert!(!doc.is_empty());
        assert!(Document::new("x".to_string()).is_empty());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["title"], "My Paper");
        assert_eq!(json["chapters"][0]["isComplete"], false);
        assert_eq!(
            json["chapters"][0]["sections"][0]["content"],
            "Why it matters"
        );
    }
}
