//! The A2ML type language embedded in `/begin A2ML … /end A2ML` blocks.
//!
//! A2ML declares, at runtime, the types that `IF_DATA` blocks in the same
//! module must conform to. The submodules split the work in two: `parser`
//! turns the token stream into the type tree defined here, and `if_data`
//! walks that tree to drive a second, data-directed parse of each `IF_DATA`
//! block.

mod if_data;
mod parser;

pub(crate) use if_data::parse_if_data;
pub(crate) use parser::parse_a2ml;

pub use if_data::{IfStruct, IfTagged, IfValue};

use indexmap::IndexMap;

/// The eight predefined scalar types of A2ML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predefined {
    Char,
    Uchar,
    Int,
    Uint,
    Long,
    Ulong,
    Float,
    Double,
}

impl Predefined {
    pub(crate) fn from_name(name: &str) -> Option<Predefined> {
        Some(match name {
            "char" => Predefined::Char,
            "uchar" => Predefined::Uchar,
            "int" => Predefined::Int,
            "uint" => Predefined::Uint,
            "long" => Predefined::Long,
            "ulong" => Predefined::Ulong,
            "float" => Predefined::Float,
            "double" => Predefined::Double,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Predefined::Char => "char",
            Predefined::Uchar => "uchar",
            Predefined::Int => "int",
            Predefined::Uint => "uint",
            Predefined::Long => "long",
            Predefined::Ulong => "ulong",
            Predefined::Float => "float",
            Predefined::Double => "double",
        }
    }

    pub(crate) fn is_integer(self) -> bool {
        matches!(
            self,
            Predefined::Uchar
                | Predefined::Int
                | Predefined::Uint
                | Predefined::Long
                | Predefined::Ulong
        )
    }
}

/// A type expression: a predefined scalar, a reference to a named type, or
/// an inline compound.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeName {
    Predefined(Predefined),
    Named(String),
    Enum(EnumType),
    Struct(StructType),
    TaggedStruct(TaggedStructType),
    TaggedUnion(TaggedUnionType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: Option<String>,
    /// Enumerator names with their optional explicit values.
    pub enumerators: Vec<(String, Option<i64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: Option<String>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub ty: TypeName,
    /// Array dimensions, outermost first; empty for a plain member.
    pub dims: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedStructType {
    pub name: Option<String>,
    pub members: Vec<TaggedStructMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedStructMember {
    pub tag: String,
    /// `None` for a bare tag, which acts as a presence marker.
    pub ty: Option<TypeName>,
    /// Written as `/begin TAG … /end TAG` in the data.
    pub block: bool,
    /// Declared with `( … )*`: may occur any number of times.
    pub repeated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedUnionType {
    pub name: Option<String>,
    pub members: Vec<TaggedUnionMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedUnionMember {
    pub tag: String,
    pub ty: Option<TypeName>,
    pub block: bool,
}

/// A top level `block "TAG" type;` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    pub tag: String,
    pub ty: TypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Block(BlockDefinition),
    Type(TypeName),
}

/// The parsed content of one `A2ML` block: the declarations in source
/// order, plus the two indexes the `IF_DATA` interpreter needs.
#[derive(Debug, Clone, PartialEq)]
pub struct A2ml {
    pub declarations: Vec<Declaration>,
    /// Named compound types, for resolving [`TypeName::Named`] references.
    pub(crate) types: IndexMap<String, TypeName>,
    /// Top level block definitions keyed by tag; `IF_DATA` interpretation
    /// starts from `blocks["IF_DATA"]`.
    pub(crate) blocks: IndexMap<String, BlockDefinition>,
}

impl A2ml {
    /// The block definition for a tag, usually `"IF_DATA"`.
    pub fn block(&self, tag: &str) -> Option<&BlockDefinition> {
        self.blocks.get(tag)
    }

    /// A named type declared in this block.
    pub fn named_type(&self, name: &str) -> Option<&TypeName> {
        self.types.get(name)
    }

    /// Follow `Named` references until a concrete type is reached.
    pub(crate) fn resolve<'a>(&'a self, mut ty: &'a TypeName) -> Option<&'a TypeName> {
        // Bounded by the number of named types, so reference cycles bail
        // out instead of spinning.
        for _ in 0..=self.types.len() {
            match ty {
                TypeName::Named(name) => ty = self.types.get(name)?,
                _ => return Some(ty),
            }
        }
        None
    }
}
