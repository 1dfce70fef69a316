mod grammar;

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::lexer::{Token, TokenKind};
use crate::source::{Preprocessor, SourceMap};
use crate::{Ast, Error, LimitTracker, Node, Position};

/// Nested `/begin` blocks, A2ML types and IF_DATA structures deeper than
/// this abort the parse instead of overflowing the stack.
pub(crate) const DEFAULT_RECURSION_LIMIT: usize = 500;

/// A per-kind hook applied to every node of that kind right after it is
/// built, before it is attached to its parent. The default is the
/// identity; callers use this to decorate nodes of selected kinds.
pub type NodeFactory = fn(Node) -> Node;

/// Parse A2L text into a typed [`Ast`].
///
/// ## Example
///
/// ```rust
/// use a2l_parser::Parser;
///
/// let ast = Parser::new(r#"
///     /begin PROJECT pump "example project"
///         /begin MODULE ecu ""
///         /end MODULE
///     /end PROJECT
/// "#)
/// .parse()
/// .unwrap();
///
/// let project = ast.project().unwrap();
/// assert_eq!(project.str_field("name"), Some("pump"));
/// assert_eq!(project.children("module").len(), 1);
/// ```
///
/// Include directives are resolved against the configured search
/// directories, in the order they were added:
///
/// ```rust,no_run
/// use a2l_parser::Parser;
///
/// let ast = Parser::new("/include \"measurements.a2l\"")
///     .include_path("./ecu/common")
///     .include_path("./ecu")
///     .parse()
///     .unwrap();
/// ```
pub struct Parser {
    input: String,
    include_paths: Vec<PathBuf>,
    overrides: IndexMap<String, NodeFactory>,
    recursion_limit: usize,
}

impl Parser {
    /// Create a new instance of a parser given an input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            include_paths: Vec::new(),
            overrides: IndexMap::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Append a directory to the `/include` search path.
    pub fn include_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_paths.push(dir.into());
        self
    }

    /// Configure the nesting limit to use while parsing.
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Register a factory for one node kind, e.g. `"PROJECT"`.
    pub fn node_override(mut self, kind: &str, factory: NodeFactory) -> Self {
        self.overrides.insert(kind.to_string(), factory);
        self
    }

    /// Run the parse. The first error aborts and is returned; the partial
    /// tree is discarded.
    pub fn parse(self) -> Result<Ast, Error> {
        let mut sources = SourceMap::new();
        let tokens = Preprocessor::new(&self.include_paths, &mut sources).run(&self.input)?;
        let mut stream = Stream::new(tokens, self.recursion_limit);
        grammar::file(&mut stream, &self.overrides, sources)
    }
}

/// Parse a standalone A2L string without includes or node overrides.
pub fn parse(input: &str) -> Result<Ast, Error> {
    Parser::new(input).parse()
}

/// The flat, include-spliced token stream the grammar walks over.
pub(crate) struct Stream {
    tokens: Vec<Token>,
    index: usize,
    pub(crate) limit: LimitTracker,
}

impl Stream {
    pub(crate) fn new(tokens: Vec<Token>, recursion_limit: usize) -> Self {
        debug_assert!(matches!(tokens.last().map(Token::kind), Some(TokenKind::Eof)));
        Self {
            tokens,
            index: 0,
            limit: LimitTracker::new(recursion_limit),
        }
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_second(&self) -> &Token {
        &self.tokens[(self.index + 1).min(self.tokens.len() - 1)]
    }

    /// Consume and return the current token. At the end of input this
    /// keeps returning the Eof token.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind() != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind() == kind
    }

    pub(crate) fn position(&self) -> Position {
        self.peek().position()
    }

    /// Consume the next token if it is `kind`, or fail with a format
    /// error naming `what` was expected.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Error> {
        if self.at(kind) {
            return Ok(self.bump());
        }
        let found = self.peek();
        Err(Error::format(
            found.position(),
            format!("expected {what}, found {}", found.describe()),
        ))
    }

    /// Enter one nesting level, failing once the limit is exceeded.
    pub(crate) fn enter(&mut self) -> Result<(), Error> {
        self.limit.consume();
        if self.limit.limited() {
            return Err(Error::format(
                self.position(),
                "nesting limit reached, aborting parse",
            ));
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.limit.release();
    }
}

/// Parse a decimal or hexadecimal A2L integer literal with optional sign.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        rest.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::parse_int;

    #[test]
    fn integer_literals() {
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("+0"), Some(0));
        assert_eq!(parse_int("-0"), Some(0));
        assert_eq!(parse_int("0xFFFF"), Some(0xFFFF));
        assert_eq!(parse_int("+0xFFFF"), Some(0xFFFF));
        assert_eq!(parse_int("-0xFFFF"), Some(-0xFFFF));
        assert_eq!(parse_int("1234567890"), Some(1_234_567_890));
        assert_eq!(parse_int("12x"), None);
        assert_eq!(parse_int("0x"), None);
    }
}
