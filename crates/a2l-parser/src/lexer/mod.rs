mod cursor;
mod token;

use crate::schema;
use crate::{Error, FileId};

use cursor::Cursor;

pub use token::Token;
pub use token::TokenKind;

/// Turns the text of one source file into tokens.
///
/// The lexer is whitespace- and comment-skipping and fail-fast: the first
/// malformed literal or unrecognized byte aborts with [`Error::Lexer`].
/// `/include` directives are emitted as ordinary tokens; splicing the
/// included file is the source manager's job, so no file I/O happens here.
///
/// Between `/begin A2ML` and `/end A2ML` the lexer switches to a second
/// vocabulary: the C-like punctuation of the A2ML type language becomes
/// significant and identifiers lose the `[`/`]` characters that A2L names
/// may carry.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
    in_a2ml: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, file: FileId) -> Self {
        Self {
            cursor: Cursor::new(input, file),
            tokens: Vec::new(),
            in_a2ml: false,
        }
    }

    /// Tokenize the whole input. The returned stream always ends with an
    /// [`TokenKind::Eof`] token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        loop {
            self.skip_trivia()?;
            if self.cursor.is_eof() {
                let position = self.cursor.position();
                self.tokens.push(Token::new(TokenKind::Eof, "", position));
                return Ok(self.tokens);
            }
            let token = self.advance()?;
            self.update_a2ml_mode(&token);
            self.tokens.push(token);
        }
    }

    /// `/begin A2ML` enters the embedded type language, `/end A2ML` leaves
    /// it. A2ML blocks do not nest.
    fn update_a2ml_mode(&mut self, token: &Token) {
        if matches!(token.kind, TokenKind::Ident | TokenKind::Keyword) && token.text == "A2ML" {
            match self.tokens.last().map(Token::kind) {
                Some(TokenKind::Begin) => self.in_a2ml = true,
                Some(TokenKind::End) => self.in_a2ml = false,
                _ => {}
            }
        }
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.cursor.first() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.cursor.bump();
                }
                Some('/') if self.cursor.second() == Some('/') => {
                    self.cursor.bump();
                    self.cursor.bump();
                    while let Some(c) = self.cursor.first() {
                        if c == '\n' {
                            break;
                        }
                        self.cursor.bump();
                    }
                }
                Some('/') if self.cursor.second() == Some('*') => {
                    let position = self.cursor.position();
                    self.cursor.bump();
                    self.cursor.bump();
                    // Block comments do not nest: the first `*/` closes.
                    loop {
                        match self.cursor.bump() {
                            Some('*') if self.cursor.eatc('/') => break,
                            Some(_) => {}
                            None => {
                                return Err(Error::lexer(position, "unterminated comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn advance(&mut self) -> Result<Token, Error> {
        let position = self.cursor.position();
        let c = self.cursor.first().expect("advance called at end of input");

        match c {
            '/' => self.directive(),
            '"' => self.string_value(),
            c if is_ident_start(c) => Ok(self.ident()),
            '+' | '-' => self.number(),
            c if c.is_ascii_digit() => self.number(),
            // Comments do not nest: the first `*/` closes, and whatever is
            // left of an inner comment is a grammar error, not lexical
            // garbage.
            '*' if !self.in_a2ml && self.cursor.second() == Some('/') => Err(Error::format(
                position,
                "unexpected `*/` outside a comment",
            )),
            '{' | '}' | '[' | ']' | '(' | ')' | ';' | ',' | '*' | '=' if self.in_a2ml => {
                self.cursor.bump();
                let kind = match c {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    '*' => TokenKind::Star,
                    _ => TokenKind::Eq,
                };
                Ok(Token::new(kind, c, position))
            }
            c => Err(Error::lexer(
                position,
                format!("unexpected character `{c}`"),
            )),
        }
    }

    /// Everything starting with a bare `/`: `/begin`, `/end`, `/include`.
    /// Comments were already consumed by `skip_trivia`.
    fn directive(&mut self) -> Result<Token, Error> {
        let position = self.cursor.position();
        self.cursor.bump();

        let mut word = String::new();
        self.cursor.eat_while(&mut word, |c| c.is_ascii_alphabetic());
        match word.as_str() {
            "begin" => Ok(Token::new(TokenKind::Begin, "/begin", position)),
            "end" => Ok(Token::new(TokenKind::End, "/end", position)),
            "include" => Ok(Token::new(TokenKind::Include, "/include", position)),
            _ => Err(Error::format(
                position,
                format!("expected `begin`, `end` or `include` after `/`, found `{word}`"),
            )),
        }
    }

    fn string_value(&mut self) -> Result<Token, Error> {
        let position = self.cursor.position();
        self.cursor.bump();

        // Strings admit embedded whitespace and newlines; bytes are kept
        // verbatim, there is no escape processing.
        let mut buf = String::new();
        loop {
            match self.cursor.bump() {
                Some('"') => return Ok(Token::new(TokenKind::Str, buf, position)),
                Some(c) => buf.push(c),
                None => return Err(Error::lexer(position, "unterminated string")),
            }
        }
    }

    fn ident(&mut self) -> Token {
        let position = self.cursor.position();
        let mut buf = String::new();
        buf.push(self.cursor.bump().unwrap());

        if self.in_a2ml {
            self.cursor.eat_while(&mut buf, is_a2ml_ident_char);
        } else {
            self.cursor.eat_while(&mut buf, is_ident_char);
        }

        // Reserved words are matched in place and re-classified.
        let kind = if schema::is_keyword(&buf) {
            TokenKind::Keyword
        } else {
            TokenKind::Ident
        };
        Token::new(kind, buf, position)
    }

    fn number(&mut self) -> Result<Token, Error> {
        let position = self.cursor.position();
        let mut buf = String::new();

        if matches!(self.cursor.first(), Some('+' | '-')) {
            buf.push(self.cursor.bump().unwrap());
        }
        if !matches!(self.cursor.first(), Some(c) if c.is_ascii_digit()) {
            return Err(Error::lexer(
                position,
                format!("expected a digit after `{buf}`"),
            ));
        }

        if self.cursor.first() == Some('0') && matches!(self.cursor.second(), Some('x' | 'X')) {
            buf.push(self.cursor.bump().unwrap());
            buf.push(self.cursor.bump().unwrap());
            let digits = buf.len();
            self.cursor.eat_while(&mut buf, |c| c.is_ascii_hexdigit());
            if buf.len() == digits {
                return Err(Error::lexer(position, "malformed hexadecimal literal"));
            }
            return Ok(Token::new(TokenKind::Int, buf, position));
        }

        self.cursor.eat_while(&mut buf, |c| c.is_ascii_digit());
        let mut is_float = false;
        if self.cursor.first() == Some('.')
            && matches!(self.cursor.second(), Some(c) if c.is_ascii_digit())
        {
            buf.push(self.cursor.bump().unwrap());
            self.cursor.eat_while(&mut buf, |c| c.is_ascii_digit());
            is_float = true;
        }
        if matches!(self.cursor.first(), Some('e' | 'E')) {
            buf.push(self.cursor.bump().unwrap());
            if matches!(self.cursor.first(), Some('+' | '-')) {
                buf.push(self.cursor.bump().unwrap());
            }
            if !matches!(self.cursor.first(), Some(c) if c.is_ascii_digit()) {
                return Err(Error::lexer(position, "malformed exponent"));
            }
            self.cursor.eat_while(&mut buf, |c| c.is_ascii_digit());
            is_float = true;
        }
        if is_float {
            return Ok(Token::new(TokenKind::Float, buf, position));
        }
        Ok(Token::new(TokenKind::Int, buf, position))
    }
}

fn is_ident_start(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

/// A2L names admit dots and index brackets, e.g. `ASAM.M.SCALAR` or
/// `map[0]`.
fn is_ident_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.' | '[' | ']')
}

/// Inside A2ML, `[` and `]` are array syntax and must stay punctuation.
fn is_a2ml_ident_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input, FileId::ROOT).tokenize().unwrap()
    }

    fn lex_err(input: &str) -> Error {
        Lexer::new(input, FileId::ROOT).tokenize().unwrap_err()
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(Token::kind).collect()
    }

    #[test]
    fn empty_input_is_a_single_eof() {
        assert_eq!(kinds(&lex("")), vec![TokenKind::Eof]);
        assert_eq!(kinds(&lex("   \r\n\t ")), vec![TokenKind::Eof]);
    }

    #[test]
    fn idents_and_keywords() {
        let tokens = lex("PROJECT project_name ASAM.M.SCALAR map[0]");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Keyword,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].text(), "ASAM.M.SCALAR");
        assert_eq!(tokens[3].text(), "map[0]");
    }

    #[test]
    fn numeric_forms() {
        let tokens = lex("0 +0 -0 0xFFFF +0xFFFF -0xFFFF 2.0 -3.25");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Int,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[5].text(), "-0xFFFF");
        assert_eq!(tokens[7].text(), "-3.25");
    }

    #[test]
    fn exponent_floats() {
        let tokens = lex("1.0E-3 2e5 1.5e+10");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Float,
                TokenKind::Eof,
            ]
        );
        assert!(matches!(lex_err("1e"), Error::Lexer { .. }));
    }

    #[test]
    fn strings_keep_bytes_verbatim() {
        let tokens = lex("\"\" \"a b\nc\"");
        assert_eq!(tokens[0].text(), "");
        assert_eq!(tokens[1].text(), "a b\nc");
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = lex("/* comment */ A2ML_VERSION // trailing\n 2 3");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Keyword, TokenKind::Int, TokenKind::Int, TokenKind::Eof]
        );
    }

    #[test]
    fn comment_with_line_feeds() {
        let tokens = lex("/*\rcomment with line feed\r\n\n*/");
        assert_eq!(kinds(&tokens), vec![TokenKind::Eof]);
    }

    #[test]
    fn comments_do_not_nest() {
        assert!(matches!(
            lex_err("/* /* comment in comment */ */"),
            Error::Format { .. }
        ));
    }

    #[test]
    fn directives() {
        let tokens = lex("/begin PROJECT /end PROJECT /include \"other.a2l\"");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Begin,
                TokenKind::Keyword,
                TokenKind::End,
                TokenKind::Keyword,
                TokenKind::Include,
                TokenKind::Str,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn non_ascii_is_a_lexer_error() {
        let err = lex_err("A2ML_VERSION \u{3053} 3");
        assert!(matches!(err, Error::Lexer { .. }));
        assert_eq!(err.position().unwrap().column, 14);
    }

    #[test]
    fn dangling_slash_is_a_format_error() {
        assert!(matches!(lex_err("/ PROJECT"), Error::Format { .. }));
        assert!(matches!(lex_err("/forward"), Error::Format { .. }));
    }

    #[test]
    fn unterminated_string_and_comment() {
        assert!(matches!(lex_err("\"abc"), Error::Lexer { .. }));
        assert!(matches!(lex_err("/* abc"), Error::Lexer { .. }));
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = lex("A2ML_VERSION\n  2 3");
        assert_eq!(tokens[0].position().line, 1);
        assert_eq!(tokens[0].position().column, 1);
        assert_eq!(tokens[1].position().line, 2);
        assert_eq!(tokens[1].position().column, 3);
        assert_eq!(tokens[2].position().column, 5);
    }

    #[test]
    fn a2ml_mode_tokenizes_punctuation() {
        let tokens = lex("/begin A2ML struct s { char[10]; }; /end A2ML");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Begin,
                TokenKind::Keyword, // A2ML
                TokenKind::Ident,   // struct
                TokenKind::Ident,   // s
                TokenKind::LBrace,
                TokenKind::Ident, // char
                TokenKind::LBracket,
                TokenKind::Int,
                TokenKind::RBracket,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::End,
                TokenKind::Keyword,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn punctuation_outside_a2ml_is_rejected() {
        assert!(matches!(lex_err("PROJECT {"), Error::Lexer { .. }));
    }
}
