//! Parser for the type-definition language inside `A2ML` blocks.
//!
//! ```text
//! decl          := 'block' STRING type_name ';' | type_name ';'
//! type_name     := predefined | enum | struct | taggedstruct
//!                | taggedunion | IDENT
//! struct        := 'struct' [IDENT] ['{' { member ';' } '}']
//! member        := type_name { '[' INT ']' }
//! enum          := 'enum' [IDENT] ['{' enumerator { ',' enumerator } '}']
//! enumerator    := STRING [ '=' INT ]
//! taggedstruct  := 'taggedstruct' [IDENT] ['{' { ts_member } '}']
//! ts_member     := '(' ts_inner [';'] ')' '*' ';' | ts_inner ';'
//! ts_inner      := ['block'] STRING [type_name]
//! taggedunion   := 'taggedunion' [IDENT] ['{' { ['block'] STRING
//!                  [type_name] ';' } '}']
//! ```
//!
//! Named compounds are registered as they are declared so later references
//! by identifier resolve; a bodyless `struct name` form is such a
//! reference.

use indexmap::IndexMap;

use crate::lexer::TokenKind;
use crate::parser::Stream;
use crate::{Error, Position};

use super::{
    A2ml, BlockDefinition, Declaration, EnumType, Member, Predefined, StructType,
    TaggedStructMember, TaggedStructType, TaggedUnionMember, TaggedUnionType, TypeName,
};

/// Parse the declarations between `/begin A2ML` and `/end A2ML`. The
/// surrounding tokens belong to the caller.
pub(crate) fn parse_a2ml(s: &mut Stream) -> Result<A2ml, Error> {
    let mut a2ml = A2ml {
        declarations: Vec::new(),
        types: IndexMap::new(),
        blocks: IndexMap::new(),
    };
    while !s.at(TokenKind::End) && !s.at(TokenKind::Eof) {
        let declaration = declaration(s, &mut a2ml)?;
        a2ml.declarations.push(declaration);
    }
    Ok(a2ml)
}

fn declaration(s: &mut Stream, a2ml: &mut A2ml) -> Result<Declaration, Error> {
    let declaration = if at_word(s, "block") {
        s.bump();
        let tag = expect_tag(s)?;
        let ty = type_name(s, a2ml)?;
        let definition = BlockDefinition { tag, ty };
        a2ml.blocks
            .insert(definition.tag.clone(), definition.clone());
        Declaration::Block(definition)
    } else {
        Declaration::Type(type_name(s, a2ml)?)
    };
    expect_punct(s, TokenKind::Semicolon)?;
    Ok(declaration)
}

fn type_name(s: &mut Stream, a2ml: &mut A2ml) -> Result<TypeName, Error> {
    let token = s.peek();
    let position = token.position();
    if !matches!(token.kind(), TokenKind::Ident | TokenKind::Keyword) {
        return Err(Error::a2ml(
            position,
            format!("expected a type name, found {}", token.describe()),
        ));
    }
    let word = s.bump().text().to_string();

    if let Some(predefined) = Predefined::from_name(&word) {
        return Ok(TypeName::Predefined(predefined));
    }
    s.enter()?;
    let ty = match word.as_str() {
        "enum" => enum_type(s, a2ml),
        "struct" => struct_type(s, a2ml),
        "taggedstruct" => tagged_struct_type(s, a2ml),
        "taggedunion" => tagged_union_type(s, a2ml),
        _ => Ok(TypeName::Named(word)),
    };
    s.leave();
    ty
}

/// `name { body }`, `name` (a reference), or an anonymous `{ body }`.
/// Returns the optional name and whether a body followed.
fn compound_head(s: &mut Stream) -> (Option<String>, bool) {
    let name = if matches!(s.peek().kind(), TokenKind::Ident | TokenKind::Keyword) {
        Some(s.bump().text().to_string())
    } else {
        None
    };
    let has_body = s.at(TokenKind::LBrace);
    if has_body {
        s.bump();
    }
    (name, has_body)
}

fn register(a2ml: &mut A2ml, name: &Option<String>, ty: &TypeName) {
    if let Some(name) = name {
        a2ml.types.insert(name.clone(), ty.clone());
    }
}

fn enum_type(s: &mut Stream, a2ml: &mut A2ml) -> Result<TypeName, Error> {
    let (name, has_body) = compound_head(s);
    if !has_body {
        return named_reference(s, name, "enum");
    }

    let mut enumerators = Vec::new();
    loop {
        let tag = expect_tag(s)?;
        let value = if s.at(TokenKind::Eq) {
            s.bump();
            Some(expect_int(s)?)
        } else {
            None
        };
        enumerators.push((tag, value));
        if s.at(TokenKind::Comma) {
            s.bump();
            // A trailing comma before the closing brace is tolerated.
            if s.at(TokenKind::RBrace) {
                break;
            }
            continue;
        }
        break;
    }
    expect_punct(s, TokenKind::RBrace)?;

    let ty = TypeName::Enum(EnumType { name: name.clone(), enumerators });
    register(a2ml, &name, &ty);
    Ok(ty)
}

fn struct_type(s: &mut Stream, a2ml: &mut A2ml) -> Result<TypeName, Error> {
    let (name, has_body) = compound_head(s);
    if !has_body {
        return named_reference(s, name, "struct");
    }

    let mut members = Vec::new();
    while !s.at(TokenKind::RBrace) {
        let ty = type_name(s, a2ml)?;
        let mut dims = Vec::new();
        while s.at(TokenKind::LBracket) {
            s.bump();
            let size = expect_int(s)?;
            if size < 0 {
                return Err(Error::a2ml(s.position(), "negative array size"));
            }
            dims.push(size as u32);
            expect_punct(s, TokenKind::RBracket)?;
        }
        expect_punct(s, TokenKind::Semicolon)?;
        members.push(Member { ty, dims });
    }
    s.bump();

    let ty = TypeName::Struct(StructType { name: name.clone(), members });
    register(a2ml, &name, &ty);
    Ok(ty)
}

fn tagged_struct_type(s: &mut Stream, a2ml: &mut A2ml) -> Result<TypeName, Error> {
    let (name, has_body) = compound_head(s);
    if !has_body {
        return named_reference(s, name, "taggedstruct");
    }

    let mut members = Vec::new();
    while !s.at(TokenKind::RBrace) {
        if s.at(TokenKind::LParen) {
            s.bump();
            let mut member = tagged_struct_inner(s, a2ml)?;
            member.repeated = true;
            // The original grammar also writes `(… ;)*`, with a semicolon
            // before the closing parenthesis.
            if s.at(TokenKind::Semicolon) {
                s.bump();
            }
            expect_punct(s, TokenKind::RParen)?;
            expect_punct(s, TokenKind::Star)?;
            expect_punct(s, TokenKind::Semicolon)?;
            members.push(member);
        } else {
            let member = tagged_struct_inner(s, a2ml)?;
            expect_punct(s, TokenKind::Semicolon)?;
            members.push(member);
        }
    }
    s.bump();

    let ty = TypeName::TaggedStruct(TaggedStructType { name: name.clone(), members });
    register(a2ml, &name, &ty);
    Ok(ty)
}

fn tagged_struct_inner(s: &mut Stream, a2ml: &mut A2ml) -> Result<TaggedStructMember, Error> {
    let block = at_word(s, "block");
    if block {
        s.bump();
    }
    let tag = expect_tag(s)?;
    let ty = if matches!(
        s.peek().kind(),
        TokenKind::Semicolon | TokenKind::RParen
    ) {
        None
    } else {
        Some(type_name(s, a2ml)?)
    };
    Ok(TaggedStructMember {
        tag,
        ty,
        block,
        repeated: false,
    })
}

fn tagged_union_type(s: &mut Stream, a2ml: &mut A2ml) -> Result<TypeName, Error> {
    let (name, has_body) = compound_head(s);
    if !has_body {
        return named_reference(s, name, "taggedunion");
    }

    let mut members = Vec::new();
    while !s.at(TokenKind::RBrace) {
        let block = at_word(s, "block");
        if block {
            s.bump();
        }
        let tag = expect_tag(s)?;
        let ty = if s.at(TokenKind::Semicolon) {
            None
        } else {
            Some(type_name(s, a2ml)?)
        };
        expect_punct(s, TokenKind::Semicolon)?;
        members.push(TaggedUnionMember { tag, ty, block });
    }
    s.bump();

    let ty = TypeName::TaggedUnion(TaggedUnionType { name: name.clone(), members });
    register(a2ml, &name, &ty);
    Ok(ty)
}

fn named_reference(
    s: &Stream,
    name: Option<String>,
    keyword: &str,
) -> Result<TypeName, Error> {
    match name {
        Some(name) => Ok(TypeName::Named(name)),
        None => Err(Error::a2ml(
            s.position(),
            format!("anonymous {keyword} requires a body"),
        )),
    }
}

fn at_word(s: &Stream, word: &str) -> bool {
    matches!(s.peek().kind(), TokenKind::Ident | TokenKind::Keyword) && s.peek().text() == word
}

fn expect_tag(s: &mut Stream) -> Result<String, Error> {
    let token = s.peek();
    if token.kind() != TokenKind::Str {
        return Err(Error::a2ml(
            token.position(),
            format!("expected a quoted tag, found {}", token.describe()),
        ));
    }
    Ok(s.bump().text().to_string())
}

fn expect_int(s: &mut Stream) -> Result<i64, Error> {
    let token = s.peek();
    let position = token.position();
    if token.kind() != TokenKind::Int {
        return Err(Error::a2ml(
            position,
            format!("expected an integer, found {}", token.describe()),
        ));
    }
    let token = s.bump();
    crate::parser::parse_int(token.text())
        .ok_or_else(|| malformed_int(position, token.text()))
}

fn malformed_int(position: Position, text: &str) -> Error {
    Error::a2ml(position, format!("integer literal `{text}` out of range"))
}

fn expect_punct(s: &mut Stream, kind: TokenKind) -> Result<(), Error> {
    let token = s.peek();
    if token.kind() != kind {
        return Err(Error::a2ml(
            token.position(),
            format!("expected `{}`, found {}", kind.describe(), token.describe()),
        ));
    }
    s.bump();
    Ok(())
}
