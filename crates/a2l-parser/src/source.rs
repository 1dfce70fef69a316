use std::fs;
use std::path::{Path, PathBuf};

use crate::lexer::{Lexer, Token, TokenKind};
use crate::{Error, FileId};

/// Maps [`FileId`]s back to the name of the file they were read from.
///
/// Id 0 is the root input; included files are added in splice order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    names: Vec<String>,
}

impl SourceMap {
    pub(crate) fn new() -> Self {
        Self { names: Vec::new() }
    }

    pub(crate) fn add(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId(self.names.len() as u32);
        self.names.push(name.into());
        id
    }

    /// The name the file was registered under, if the id is known.
    pub fn name(&self, file: FileId) -> Option<&str> {
        self.names.get(file.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Lexes the root input and splices every `/include "path"` directive in
/// place, depth first. The result is one flat token stream whose positions
/// still point into the file each token came from.
pub(crate) struct Preprocessor<'a> {
    search_paths: &'a [PathBuf],
    map: &'a mut SourceMap,
    /// Canonical paths of the include chain currently being expanded.
    active: Vec<PathBuf>,
}

impl<'a> Preprocessor<'a> {
    pub(crate) fn new(search_paths: &'a [PathBuf], map: &'a mut SourceMap) -> Self {
        Self {
            search_paths,
            map,
            active: Vec::new(),
        }
    }

    pub(crate) fn run(mut self, input: &str) -> Result<Vec<Token>, Error> {
        let root = self.map.add("<input>");
        let mut out = Vec::new();
        self.splice(input, root, &mut out)?;
        // Only the outermost end-of-input survives splicing.
        let eof = out
            .last()
            .cloned()
            .expect("lexer always produces an Eof token");
        debug_assert_eq!(eof.kind(), TokenKind::Eof);
        Ok(out)
    }

    fn splice(&mut self, source: &str, file: FileId, out: &mut Vec<Token>) -> Result<(), Error> {
        let tokens = Lexer::new(source, file).tokenize()?;
        let mut tokens = tokens.into_iter().peekable();

        while let Some(token) = tokens.next() {
            match token.kind() {
                TokenKind::Include => {
                    let target = match tokens.next() {
                        Some(t) if t.kind() == TokenKind::Str => t,
                        Some(t) => {
                            return Err(Error::format(
                                t.position(),
                                format!("expected a quoted path after /include, found {}", t.describe()),
                            ))
                        }
                        None => unreachable!("token stream ends with Eof"),
                    };
                    self.include(&target, out)?;
                }
                TokenKind::Eof if file != FileId::ROOT => {
                    // Drop the Eof of included files so the stream stays flat.
                }
                _ => out.push(token),
            }
        }
        Ok(())
    }

    fn include(&mut self, target: &Token, out: &mut Vec<Token>) -> Result<(), Error> {
        let path = Path::new(target.text());
        let resolved = self.resolve(path).ok_or_else(|| Error::IncludeNotFound {
            position: target.position(),
            path: target.text().to_string(),
        })?;

        let canonical = resolved.canonicalize().unwrap_or_else(|_| resolved.clone());
        if self.active.contains(&canonical) {
            return Err(Error::IncludeCycle {
                position: target.position(),
                path: target.text().to_string(),
            });
        }

        let content = fs::read_to_string(&resolved).map_err(|e| Error::Io {
            position: target.position(),
            path: resolved.display().to_string(),
            message: e.to_string(),
        })?;

        let file = self.map.add(resolved.display().to_string());
        self.active.push(canonical);
        let result = self.splice(&content, file, out);
        self.active.pop();
        result
    }

    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        for dir in self.search_paths {
            let candidate = dir.join(path);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}
