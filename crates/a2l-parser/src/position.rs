use std::fmt;

/// Identifies one source file inside a parse.
///
/// Id `0` is always the root input handed to [`crate::Parser::new`]; every
/// `/include`d file gets the next id in splice order. The id can be resolved
/// back to a file name through [`crate::Ast::source_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub u32);

impl FileId {
    pub const ROOT: FileId = FileId(0);
}

/// A source position: file, 1-based line and 1-based column.
///
/// Tokens read from an included file report the position inside that file,
/// not the position of the `/include` directive that spliced it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file == FileId::ROOT {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "file#{}:{}:{}", self.file.0, self.line, self.column)
        }
    }
}
