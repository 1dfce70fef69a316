//! Parser for ASAM MCD-2 MC (A2L) ECU description files.
//!
//! A2L is the block-structured description language used in automotive
//! calibration: it declares an ECU's measurement points, characteristics,
//! conversion methods, memory layout and variant coding. This crate turns
//! A2L text into a typed [`Ast`] with per-node attribute access, ordered
//! child collections, `find-by-kind` traversal and round-trip textual
//! emission.
//!
//! Two embedded languages are handled along the way: the A2ML type grammar
//! inside `/begin A2ML … /end A2ML` blocks is parsed into a schema, and
//! every subsequent `IF_DATA` block of the same module is parsed *against*
//! that schema into a dynamically shaped, schema-checked fragment.
//!
//! ## Example
//!
//! ```rust
//! use a2l_parser::parse;
//!
//! let ast = parse(r#"
//!     ASAP2_VERSION 1 51
//!     /begin PROJECT pump "example project"
//!         /begin MODULE ecu ""
//!             /begin MEASUREMENT n "engine speed" UWORD r_rpm 1 0 0.0 8000.0
//!                 ECU_ADDRESS 0x12345678
//!             /end MEASUREMENT
//!         /end MODULE
//!     /end PROJECT
//! "#)
//! .unwrap();
//!
//! let measurement = &ast.nodes("MEASUREMENT")[0];
//! assert_eq!(measurement.str_field("name"), Some("n"));
//! assert_eq!(measurement.int_field("ecu_address"), Some(0x12345678));
//! ```
//!
//! Parsing is fail-fast: the first lexical, grammatical or schema error
//! aborts and is returned as an [`Error`] carrying the source position,
//! including positions inside `/include`d files.

mod error;
mod lexer;
mod limit;
mod position;
mod source;

pub mod a2ml;
pub mod ast;
pub mod schema;

mod parser;

pub use crate::ast::{Ast, Attr, IfDataContent, Node, Value};
pub use crate::error::Error;
pub use crate::lexer::{Lexer, Token, TokenKind};
pub use crate::limit::LimitTracker;
pub use crate::parser::{parse, NodeFactory, Parser};
pub use crate::position::{FileId, Position};
pub use crate::source::SourceMap;
