use std::fmt;

use crate::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A name: `[A-Za-z_][A-Za-z0-9_.\[\]]*`.
    Ident,
    /// A name that matches one of the reserved A2L keywords.
    Keyword,
    /// `[+-]?(0x[0-9A-Fa-f]+|[0-9]+)`, lexeme kept verbatim.
    Int,
    /// `[+-]?[0-9]+.[0-9]+`, lexeme kept verbatim.
    Float,
    /// A double-quoted string; `text` holds the content without the quotes.
    Str,
    /// `/begin`
    Begin,
    /// `/end`
    End,
    /// `/include`
    Include,
    // Punctuation, only produced inside `/begin A2ML … /end A2ML`.
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Semicolon,
    Comma,
    Star,
    Eq,
    /// End of the (spliced) input, always the last token.
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::Str => "string",
            TokenKind::Begin => "/begin",
            TokenKind::End => "/end",
            TokenKind::Include => "/include",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Star => "*",
            TokenKind::Eq => "=",
            TokenKind::Eof => "end of file",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) position: Position,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The token's lexeme. For string tokens this is the content between the
    /// quotes.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// What to call this token in an error message.
    pub(crate) fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Str => format!("\"{}\"", self.text),
            _ => format!("`{}`", self.text),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}@{} {:?}",
            self.kind, self.position, self.text
        )
    }
}
