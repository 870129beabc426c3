//! Post-stream audit of a finished outline
//!
//! The streaming scanner is best effort: it drops orphan sections, empty
//! headings and every body line after the first, and waits on a heading that
//! never got its terminating newline. Once the stream has closed, the full text is parsed again with
//! pulldown-cmark and compared with the tree so the losses can be reported.
//! The tree itself is never modified.

use crate::outline_model::Document;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use std::fmt;
use std::ops::Range;

/// Characters of unconsumed text quoted in a finding
const PREVIEW_CHARS: usize = 40;

/// Something the streaming parse lost or could not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFinding {
    /// More than one `# ` heading; only one title is kept
    MultipleTitles { count: usize },
    /// Heading with no text
    EmptyHeading { level: usize },
    /// Section heading before any chapter
    OrphanSection { title: String },
    /// Section body spanning several lines; only the first is kept
    TruncatedBody { section: String, dropped_lines: usize },
    /// Number of chapters in the text differs from the tree
    ChapterCountMismatch { expected: usize, actual: usize },
    /// Text after the cursor that never formed a token
    UnconsumedTail { offset: usize, preview: String },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditFinding::MultipleTitles { count } => {
                write!(f, "{} title headings found, only one is kept", count)
            }
            AuditFinding::EmptyHeading { level } => write!(f, "Empty h{} heading", level),
            AuditFinding::OrphanSection { title } => {
                write!(f, "Section '{}' appears before any chapter", title)
            }
            AuditFinding::TruncatedBody {
                section,
                dropped_lines,
            } => write!(
                f,
                "Section '{}' lost {} body line(s) after the first",
                section, dropped_lines
            ),
            AuditFinding::ChapterCountMismatch { expected, actual } => write!(
                f,
                "Text has {} chapters but the outline has {}",
                expected, actual
            ),
            AuditFinding::UnconsumedTail { offset, preview } => {
                write!(f, "Unparsed text at byte {}: '{}'", offset, preview)
            }
        }
    }
}

/// A heading as CommonMark sees it
struct ReferenceHeading {
    level: usize,
    text: String,
    range: Range<usize>,
}

/// Compare the final outline text with the tree built from it
///
/// # Parameters
/// * `text` - Complete outline text
/// * `consumed` - Scanner cursor after the last feed
/// * `doc` - Tree built by the streaming parser
///
/// # Returns
/// * `Vec<AuditFinding>` - Findings in text order, tail last; empty when clean
pub fn audit(text: &str, consumed: usize, doc: &Document) -> Vec<AuditFinding> {
    let headings = collect_headings(text);
    let mut findings = Vec::new();

    let titles = headings.iter().filter(|h| h.level == 1).count();
    if titles > 1 {
        findings.push(AuditFinding::MultipleTitles { count: titles });
    }

    let mut chapters = 0;
    for (i, heading) in headings.iter().enumerate() {
        if heading.text.is_empty() {
            findings.push(AuditFinding::EmptyHeading {
                level: heading.level,
            });
            continue;
        }
        match heading.level {
            2 => chapters += 1,
            3 if chapters == 0 => findings.push(AuditFinding::OrphanSection {
                title: heading.text.clone(),
            }),
            3 => {
                let body_end = headings
                    .get(i + 1)
                    .map_or(text.len(), |next| next.range.start);
                let lines = count_lines(text.get(heading.range.end..body_end).unwrap_or(""));
                if lines > 1 {
                    findings.push(AuditFinding::TruncatedBody {
                        section: heading.text.clone(),
                        dropped_lines: lines - 1,
                    });
                }
            }
            _ => {}
        }
    }

    if chapters != doc.chapters.len() {
        findings.push(AuditFinding::ChapterCountMismatch {
            expected: chapters,
            actual: doc.chapters.len(),
        });
    }

    if let Some(tail) = text.get(consumed..) {
        if !tail.trim().is_empty() {
            findings.push(AuditFinding::UnconsumedTail {
                offset: consumed,
                preview: tail.trim().chars().take(PREVIEW_CHARS).collect(),
            });
        }
    }

    for finding in &findings {
        log::info!("Audit: {}", finding);
    }
    findings
}

fn collect_headings(text: &str) -> Vec<ReferenceHeading> {
    let mut headings = Vec::new();
    let mut current: Option<ReferenceHeading> = None;

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some(ReferenceHeading {
                    level: heading_depth(level),
                    text: String::new(),
                    range,
                });
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some(heading) = current.as_mut() {
                    heading.text.push_str(&t);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = current.take() {
                    heading.text = heading.text.trim().to_string();
                    headings.push(heading);
                }
            }
            _ => {}
        }
    }

    headings
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn count_lines(body: &str) -> usize {
    body.lines().filter(|line| !line.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream_parser::OutlineParser;

    fn run(text: &str) -> Vec<AuditFinding> {
        let mut parser = OutlineParser::new();
        let doc = parser.feed(text);
        audit(text, parser.cursor(), &doc)
    }

    #[test]
    fn test_clean_outline_has_no_findings() {
        let findings = run("# T\n\n## A\n### S1\nbody1\n\n### S2\nbody2\n\n## B\n");
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_orphan_and_empty_headings() {
        let findings = run("### Early\nbody\n\n## \n## A\n");
        assert_eq!(
            findings,
            vec![
                AuditFinding::OrphanSection {
                    title: "Early".to_string()
                },
                AuditFinding::EmptyHeading { level: 2 },
            ]
        );
    }

    #[test]
    fn test_truncated_body_keeps_later_chapters() {
        let text = "## A\n### S\nfirst\nsecond\nthird\n\n## B\n";
        let mut parser = OutlineParser::new();
        let doc = parser.feed(text);
        assert_eq!(doc.chapter_titles(), vec!["A", "B"]);

        assert_eq!(
            audit(text, parser.cursor(), &doc),
            vec![AuditFinding::TruncatedBody {
                section: "S".to_string(),
                dropped_lines: 2
            }]
        );
    }

    #[test]
    fn test_stream_cut_inside_a_section() {
        let findings = run("## A\n### S\nbody");
        assert_eq!(
            findings,
            vec![AuditFinding::UnconsumedTail {
                offset: 5,
                preview: "### S\nbody".to_string()
            }]
        );
    }

    #[test]
    fn test_repeated_titles() {
        let findings = run("# One\n\n# Two\n\n## A\n");
        assert_eq!(findings, vec![AuditFinding::MultipleTitles { count: 2 }]);
    }

    #[test]
    fn test_missing_final_newline() {
        let findings = run("## A\n## B");
        assert_eq!(
            findings,
            vec![
                AuditFinding::ChapterCountMismatch {
                    expected: 2,
                    actual: 1
                },
                AuditFinding::UnconsumedTail {
                    offset: 5,
                    preview: "## B".to_string()
                },
            ]
        );
    }
}
