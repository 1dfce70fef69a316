use crate::Position;

/// An `Error` type for everything that can go wrong while turning A2L text
/// into an [`crate::Ast`].
///
/// The parse is fail-fast: the first error aborts the whole parse and the
/// partially built tree is discarded. Every variant that originates inside
/// the input carries the [`Position`] (file, line, column) of the offending
/// token.
///
/// ## Example
/// ```rust
/// use a2l_parser::parse;
///
/// let err = parse("A2ML_VERSION 1").unwrap_err();
/// assert!(err.position().is_some());
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An unrecognized byte or malformed literal in the input.
    #[error("lexical error at {position}: {message}")]
    Lexer { position: Position, message: String },

    /// An A2L grammar violation: missing or extra token, unbalanced
    /// `/begin`/`/end`, a duplicated singleton, or a scalar of the wrong
    /// kind.
    #[error("format error at {position}: {message}")]
    Format { position: Position, message: String },

    /// A syntax error inside a `/begin A2ML … /end A2ML` block.
    #[error("A2ML format error at {position}: {message}")]
    A2mlFormat { position: Position, message: String },

    /// An `IF_DATA` block that does not conform to the A2ML schema declared
    /// by the enclosing module.
    #[error("schema violation at {position}: {message}")]
    Schema { position: Position, message: String },

    /// An `/include` whose target exists in none of the search directories.
    #[error("include file not found at {position}: {path}")]
    IncludeNotFound { position: Position, path: String },

    /// An `/include` chain that came back to a file already being included.
    #[error("include cycle at {position}: {path}")]
    IncludeCycle { position: Position, path: String },

    /// An include target that resolved but could not be read.
    #[error("failed to read include {path} at {position}: {message}")]
    Io {
        position: Position,
        path: String,
        message: String,
    },
}

impl Error {
    pub(crate) fn lexer(position: Position, message: impl Into<String>) -> Self {
        Error::Lexer {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn format(position: Position, message: impl Into<String>) -> Self {
        Error::Format {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn a2ml(position: Position, message: impl Into<String>) -> Self {
        Error::A2mlFormat {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn schema(position: Position, message: impl Into<String>) -> Self {
        Error::Schema {
            position,
            message: message.into(),
        }
    }

    /// The position the error was raised at.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Lexer { position, .. }
            | Error::Format { position, .. }
            | Error::A2mlFormat { position, .. }
            | Error::Schema { position, .. }
            | Error::IncludeNotFound { position, .. }
            | Error::IncludeCycle { position, .. }
            | Error::Io { position, .. } => Some(*position),
        }
    }

    /// The human readable part of the error, without the position prefix.
    pub fn message(&self) -> &str {
        match self {
            Error::Lexer { message, .. }
            | Error::Format { message, .. }
            | Error::A2mlFormat { message, .. }
            | Error::Schema { message, .. }
            | Error::Io { message, .. } => message,
            Error::IncludeNotFound { path, .. } | Error::IncludeCycle { path, .. } => path,
        }
    }
}
