//! Incremental buffer scanner
//!
//! Each call hands over the whole text received so far. Matching restarts at
//! the cursor, the end of the last token consumed, so already-emitted headings
//! are never seen twice. A heading whose terminating newline has not arrived
//! parks the cursor on its marker and waits for the next call. Complete lines
//! that do not start a heading (extra body lines, preamble text) are dropped.

use super::classify::{classify, Classified};
use super::token::{Token, TokenKind};

/// Cursor-based tokenizer over a growing buffer
#[derive(Debug, Clone, Default)]
pub struct OutlineScanner {
    /// Full text seen so far
    buffer: String,
    /// Byte offset where matching for the next token starts
    cursor: usize,
}

impl OutlineScanner {
    /// Create a scanner starting at offset 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner that skips the first `offset` bytes of the stream
    pub fn with_offset(offset: usize) -> Self {
        Self {
            buffer: String::new(),
            cursor: offset,
        }
    }

    /// Byte offset of the first unconsumed character
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text seen so far
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Unconsumed part of the buffer (empty while the cursor is past its end)
    pub fn pending(&self) -> &str {
        self.buffer.get(self.cursor..).unwrap_or("")
    }

    /// Replace the buffer with `text` and extract every complete token
    ///
    /// # Parameters
    /// * `text` - Cumulative stream text, an extension of the previous buffer
    ///
    /// # Returns
    /// * `Vec<Token>` - Newly completed tokens in document order (often empty)
    pub fn feed(&mut self, text: &str) -> Vec<Token> {
        if !self.accepts(text) {
            log::warn!(
                "Ignoring fragment of {} bytes: it does not extend the consumed prefix ({} bytes)",
                text.len(),
                self.cursor
            );
            return Vec::new();
        }
        self.buffer.clear();
        self.buffer.push_str(text);

        let mut tokens = Vec::new();
        while let Some(token) = self.step() {
            tokens.push(token);
        }
        tokens
    }

    /// Extract at most one token at the cursor
    pub fn step(&mut self) -> Option<Token> {
        self.settle_cursor();
        let classified = classify(self.buffer.get(self.cursor..)?);
        let hit = match classified {
            Some(hit) => hit,
            None => self.skip_to_heading()?,
        };
        let start = self.cursor + hit.marker_at;
        let text_from = start + hit.kind.marker().len();

        match hit.kind {
            TokenKind::Title => {
                let Some(end) = self.find_from("\n\n", text_from) else {
                    return self.park(start);
                };
                let title = self.buffer[text_from..end].trim().to_string();
                self.advance(end + 2);
                Some(Token::Title(title))
            }
            TokenKind::Chapter => {
                let Some(line_end) = self.find_from("\n", text_from) else {
                    return self.park(start);
                };
                let title = self.buffer[text_from..line_end].trim().to_string();
                self.advance(line_end + 1);
                Some(Token::Chapter(title))
            }
            TokenKind::Section => {
                let Some(line_end) = self.find_from("\n", text_from) else {
                    return self.park(start);
                };
                let Some(body_end) = self.find_from("\n", line_end + 1) else {
                    return self.park(start);
                };
                let heading = self.buffer[text_from..line_end].trim().to_string();
                let body = self.buffer[line_end + 1..body_end].trim().to_string();
                self.advance(body_end + 1);
                Some(Token::Section { heading, body })
            }
        }
    }

    /// Drop complete lines at the cursor until one starts a heading
    ///
    /// The unterminated last line is kept, since more text may turn it into a
    /// heading marker.
    fn skip_to_heading(&mut self) -> Option<Classified> {
        let (skipped, hit) = {
            let rest = self.buffer.get(self.cursor..)?;
            let mut offset = 0;
            let mut hit = None;
            while let Some(newline) = rest[offset..].find('\n') {
                offset += newline + 1;
                hit = classify(&rest[offset..]);
                if hit.is_some() {
                    break;
                }
            }
            (offset, hit)
        };

        if skipped > 0 {
            log::debug!(
                "Dropping {} bytes of non-heading text at {}",
                skipped,
                self.cursor
            );
            self.advance(self.cursor + skipped);
        }
        hit
    }

    /// A fragment is usable when the cursor still falls inside it on a char boundary
    fn accepts(&self, text: &str) -> bool {
        if self.buffer.is_empty() || self.cursor > self.buffer.len() {
            // nothing consumed from real text yet
            return true;
        }
        text.is_char_boundary(self.cursor)
    }

    fn find_from(&self, needle: &str, from: usize) -> Option<usize> {
        self.buffer
            .get(from..)
            .and_then(|s| s.find(needle))
            .map(|i| from + i)
    }

    fn park(&mut self, at: usize) -> Option<Token> {
        if at != self.cursor {
            log::trace!("Parking cursor at {} awaiting more text", at);
        }
        self.advance(at);
        None
    }

    fn advance(&mut self, to: usize) {
        debug_assert!(to >= self.cursor, "cursor must never move backwards");
        self.cursor = self.cursor.max(to);
    }

    /// Move a cursor that landed inside a multi-byte character to the next boundary
    fn settle_cursor(&mut self) {
        while self.cursor < self.buffer.len() && !self.buffer.is_char_boundary(self.cursor) {
            self.cursor += 1;
        }
    }
}
