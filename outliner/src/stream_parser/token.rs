//! Structural tokens recognized in the outline stream

/// Kind of heading found at the cursor, in classification priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `# ` document title, terminated by a blank line
    Title,
    /// `## ` chapter heading, terminated by a newline
    Chapter,
    /// `### ` section heading plus one body line
    Section,
}

impl TokenKind {
    /// Heading marker including its trailing space
    pub fn marker(self) -> &'static str {
        match self {
            TokenKind::Title => "# ",
            TokenKind::Chapter => "## ",
            TokenKind::Section => "### ",
        }
    }
}

/// A complete structural unit extracted from the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Document title text
    Title(String),
    /// Chapter heading text
    Chapter(String),
    /// Section heading text and its body line
    Section { heading: String, body: String },
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Title(_) => TokenKind::Title,
            Token::Chapter(_) => TokenKind::Chapter,
            Token::Section { .. } => TokenKind::Section,
        }
    }
}
