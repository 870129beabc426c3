//! Flat, reorderable projection of the outline tree
//!
//! Drag-and-drop lists work on a flat sequence, so the tree is flattened
//! depth first: each chapter followed by its own sections. The projection is
//! rebuilt from scratch on every tree change; user edits and moves apply to
//! the list only, never to the tree.

use crate::outline_model::Document;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether an item came from a chapter or a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Chapter,
    Section,
}

/// One row of the reorderable outline list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineItem {
    /// `chapter-{id}` or `section-{id}`
    pub id: String,
    /// Heading text
    pub content: String,
    /// Section body; empty for chapters
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// 1 for chapters, 2 for sections
    pub level: u8,
    /// Position among siblings in the tree
    pub original_index: usize,
    /// Index of the owning chapter (sections only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chapter_index: Option<usize>,
}

/// Errors raised by list edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("Item index {index} is out of range for a list of {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Flatten the tree into list items
pub fn project(document: &Document) -> Vec<OutlineItem> {
    let mut items = Vec::with_capacity(document.chapters.len() + document.section_count());

    for (chapter_index, chapter) in document.chapters.iter().enumerate() {
        items.push(OutlineItem {
            id: format!("chapter-{}", chapter.id),
            content: chapter.title.clone(),
            description: String::new(),
            kind: ItemKind::Chapter,
            level: 1,
            original_index: chapter_index,
            chapter_index: None,
        });

        for (section_index, section) in chapter.sections.iter().enumerate() {
            items.push(OutlineItem {
                id: format!("section-{}", section.id),
                content: section.title.clone(),
                description: section.content.clone(),
                kind: ItemKind::Section,
                level: 2,
                original_index: section_index,
                chapter_index: Some(chapter_index),
            });
        }
    }

    items
}

/// Editable list of outline items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlineList {
    items: Vec<OutlineItem>,
}

impl OutlineList {
    /// Build the list from a tree snapshot
    pub fn from_document(document: &Document) -> Self {
        Self {
            items: project(document),
        }
    }

    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Move the item at `source` so it ends up at `destination`
    ///
    /// A `None` destination is a drop outside the list and leaves it unchanged.
    pub fn move_item(
        &mut self,
        source: usize,
        destination: Option<usize>,
    ) -> Result<(), ProjectionError> {
        let Some(destination) = destination else {
            return Ok(());
        };
        self.check_index(source)?;
        self.check_index(destination)?;

        let item = self.items.remove(source);
        self.items.insert(destination, item);
        Ok(())
    }

    /// Replace the heading text of one item
    pub fn set_content(&mut self, index: usize, content: &str) -> Result<(), ProjectionError> {
        self.check_index(index)?;
        self.items[index].content = content.to_string();
        Ok(())
    }

    /// Replace the description of one item
    pub fn set_description(
        &mut self,
        index: usize,
        description: &str,
    ) -> Result<(), ProjectionError> {
        self.check_index(index)?;
        self.items[index].description = description.to_string();
        Ok(())
    }

    /// Serialize the list into the paper-generation request text
    ///
    /// Items appear in list order as `content + description`, comma separated,
    /// after `{prefix} + `.
    pub fn paper_request(&self, prefix: &str) -> String {
        let outline = self
            .items
            .iter()
            .map(|item| format!("{} + {}", item.content, item.description))
            .join(", ");
        format!("{} + {}", prefix, outline)
    }

    fn check_index(&self, index: usize) -> Result<(), ProjectionError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(ProjectionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline_model::{OutlineBuilder, SequentialIds, TitlePolicy};

    fn sample() -> Document {
        let mut b = OutlineBuilder::with_ids(Box::new(SequentialIds::new("x")), TitlePolicy::LastWins);
        b.apply_title("Paper");
        b.apply_chapter("A");
        b.apply_section("A1", "first");
        b.apply_section("A2", "second");
        b.apply_chapter("B");
        let doc = b.apply_section("B1", "third");
        (*doc).clone()
    }

    #[test]
    fn test_projection_order_and_fields() {
        let items = project(&sample());

        let contents: Vec<_> = items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "A1", "A2", "B", "B1"]);

        assert_eq!(items[0].id, "chapter-x-2");
        assert_eq!(items[0].kind, ItemKind::Chapter);
        assert_eq!(items[0].level, 1);
        assert_eq!(items[0].description, "");
        assert_eq!(items[0].chapter_index, None);

        assert_eq!(items[2].id, "section-x-4");
        assert_eq!(items[2].kind, ItemKind::Section);
        assert_eq!(items[2].level, 2);
        assert_eq!(items[2].description, "second");
        assert_eq!(items[2].original_index, 1);
        assert_eq!(items[2].chapter_index, Some(0));

        assert_eq!(items[4].chapter_index, Some(1));
        assert_eq!(items[3].original_index, 1);
    }

    #[test]
    fn test_move_item() {
        let mut list = OutlineList::from_document(&sample());
        list.move_item(4, Some(0)).unwrap();
        let contents: Vec<_> = list.items().iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["B1", "A", "A1", "A2", "B"]);

        list.move_item(0, Some(4)).unwrap();
        let contents: Vec<_> = list.items().iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["A", "A1", "A2", "B", "B1"]);
    }

    #[test]
    fn test_cancelled_drop_is_noop() {
        let mut list = OutlineList::from_document(&sample());
        let before = list.clone();
        list.move_item(1, None).unwrap();
        assert_eq!(list, before);
    }

    #[test]
    fn test_out_of_range_edits() {
        let mut list = OutlineList::from_document(&sample());
        assert_eq!(
            list.move_item(9, Some(0)),
            Err(ProjectionError::IndexOutOfRange { index: 9, len: 5 })
        );
        assert!(list.move_item(0, Some(5)).is_err());
        assert!(list.set_content(5, "x").is_err());
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_paper_request() {
        let mut list = OutlineList::from_document(&sample());
        list.set_description(0, "overview").unwrap();
        list.set_content(4, "B one").unwrap();

        assert_eq!(
            list.paper_request("大纲为"),
            "大纲为 + A + overview, A1 + first, A2 + second, B + , B one + third"
        );
    }

    #[test]
    fn test_item_json_shape() {
        let items = project(&sample());
        let json = serde_json::to_value(&items[1]).unwrap();
        assert_eq!(json["type"], "section");
        assert_eq!(json["originalIndex"], 0);
        assert_eq!(json["chapterIndex"], 0);

        let json = serde_json::to_value(&items[0]).unwrap();
        assert!(json.get("chapterIndex").is_none());
    }
}
