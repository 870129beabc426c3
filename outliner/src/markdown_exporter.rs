//! Markdown exporter for outlines
//!
//! Writes a tree (or an edited projection list) in the same heading layout the
//! streaming parser reads:
//! - `# title` followed by a blank line
//! - `## chapter` on its own line
//! - `### section` followed by its one-line body and a blank line

use crate::outline_model::Document;
use crate::projection::{ItemKind, OutlineItem};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during markdown export
#[derive(Error, Debug)]
pub enum MarkdownExportError {
    #[error("IO error writing {path}: {source}", path = .path.display())]
    IoError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render a document tree as outline markdown
pub fn render_document(doc: &Document) -> String {
    let mut output = String::new();

    write_title(&mut output, &doc.title);

    for chapter in &doc.chapters {
        write_chapter(&mut output, &chapter.title);
        for section in &chapter.sections {
            write_section(&mut output, &section.title, &section.content);
        }
    }

    output
}

/// Render projection items, in list order, as outline markdown
///
/// Items whose heading is blank after editing are skipped.
pub fn render_items(title: &str, items: &[OutlineItem]) -> String {
    let mut output = String::new();

    write_title(&mut output, title);

    for item in items.iter().filter(|i| !i.content.trim().is_empty()) {
        match item.kind {
            ItemKind::Chapter => write_chapter(&mut output, &item.content),
            ItemKind::Section => write_section(&mut output, &item.content, &item.description),
        }
    }

    output
}

/// Export a document to a markdown file
///
/// # Parameters
/// * `doc` - The outline to export
/// * `output_path` - Path where the markdown file will be written
///
/// # Returns
/// * `Ok(())` - Successfully exported to markdown
/// * `Err(MarkdownExportError)` - Error during export
pub fn to_markdown(doc: &Document, output_path: &Path) -> Result<(), MarkdownExportError> {
    let output = render_document(doc);

    let io_error = |source| MarkdownExportError::IoError {
        path: output_path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(output_path).map_err(io_error)?;
    file.write_all(output.as_bytes()).map_err(io_error)?;

    Ok(())
}

fn write_title(output: &mut String, title: &str) {
    let title = single_line(title);
    if !title.is_empty() {
        output.push_str(&format!("# {}\n\n", title));
    }
}

fn write_chapter(output: &mut String, title: &str) {
    output.push_str(&format!("## {}\n", single_line(title)));
}

fn write_section(output: &mut String, title: &str, content: &str) {
    // the parser keeps one body line, so multi-line edits are folded
    output.push_str(&format!(
        "### {}\n{}\n\n",
        single_line(title),
        single_line(content)
    ));
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
