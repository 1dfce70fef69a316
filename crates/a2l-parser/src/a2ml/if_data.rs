//! Schema-driven interpretation of `IF_DATA` blocks.
//!
//! An `IF_DATA` block has no fixed grammar; its shape is dictated by the
//! A2ML type tree the enclosing module declared. The interpreter walks
//! that tree and consumes tokens as the types demand, producing
//! dynamically shaped but schema-checked [`IfValue`] fragments.

use indexmap::IndexMap;
use triomphe::Arc;

use crate::ast::{IfDataContent, Node, Value};
use crate::lexer::TokenKind;
use crate::parser::Stream;
use crate::schema;
use crate::Error;

use super::{A2ml, Predefined, TypeName};

/// A value inside an `IF_DATA` fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum IfValue {
    Scalar(Value),
    /// An array member's values.
    Sequence(Vec<IfValue>),
    /// A struct fragment with positional items and tagged members.
    Struct(IfStruct),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IfStruct {
    pub(crate) items: Vec<IfValue>,
    pub(crate) tagged: IndexMap<String, IfTagged>,
}

/// The occurrences of one tag inside a tagged struct or union fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct IfTagged {
    pub(crate) block: bool,
    pub(crate) repeated: bool,
    pub(crate) values: Vec<IfValue>,
}

impl IfValue {
    /// Positional access: struct items or sequence elements, 0-based.
    pub fn item(&self, index: usize) -> Option<&IfValue> {
        match self {
            IfValue::Struct(s) => s.items.get(index),
            IfValue::Sequence(values) => values.get(index),
            IfValue::Scalar(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IfValue::Struct(s) => s.items.len(),
            IfValue::Sequence(values) => values.len(),
            IfValue::Scalar(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value of a tagged member; `None` when the tag is absent. For a
    /// repeated member this is the first occurrence.
    pub fn get(&self, tag: &str) -> Option<&IfValue> {
        match self {
            IfValue::Struct(s) => s.tagged.get(tag)?.values.first(),
            _ => None,
        }
    }

    /// All occurrences of a repeated tagged member, in input order.
    pub fn list(&self, tag: &str) -> &[IfValue] {
        match self {
            IfValue::Struct(s) => s
                .tagged
                .get(tag)
                .map(|t| t.values.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Whether a tag occurred at all. Unlike [`IfValue::get`] this is also
    /// `true` for bare presence-marker tags, which carry no value.
    pub fn has(&self, tag: &str) -> bool {
        match self {
            IfValue::Struct(s) => s.tagged.contains_key(tag),
            _ => false,
        }
    }

    /// Tags present on this fragment, in input order.
    pub fn tags(&self) -> Vec<&str> {
        match self {
            IfValue::Struct(s) => s.tagged.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            IfValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        self.as_value()?.as_int()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value()?.as_f64()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value()?.as_str()
    }

    /// Scalar value of `item(index)`, the common case for struct access.
    pub fn int_at(&self, index: usize) -> Option<i64> {
        self.item(index)?.as_int()
    }

    pub fn str_at(&self, index: usize) -> Option<&str> {
        self.item(index)?.as_str()
    }
}

/// Parse one `IF_DATA` block body. The caller has consumed
/// `/begin IF_DATA`; this consumes the selecting tag, the data, and the
/// closing `/end IF_DATA`.
pub(crate) fn parse_if_data(s: &mut Stream, a2ml: Option<&Arc<A2ml>>) -> Result<Node, Error> {
    let position = s.position();
    let tag_token = s.peek();
    if !matches!(tag_token.kind(), TokenKind::Ident | TokenKind::Keyword) {
        return Err(Error::schema(
            tag_token.position(),
            format!("expected an interface name, found {}", tag_token.describe()),
        ));
    }
    let tag = s.bump().text().to_string();

    let a2ml = a2ml.ok_or_else(|| {
        Error::schema(position, "IF_DATA without an A2ML schema in this module")
    })?;
    let definition = a2ml.block("IF_DATA").ok_or_else(|| {
        Error::schema(position, "the A2ML schema declares no IF_DATA block")
    })?;
    let union = match a2ml.resolve(&definition.ty) {
        Some(TypeName::TaggedUnion(union)) => union,
        _ => {
            return Err(Error::schema(
                position,
                "the IF_DATA block definition is not a taggedunion",
            ))
        }
    };
    let member = union.members.iter().find(|m| m.tag == tag).ok_or_else(|| {
        Error::schema(position, format!("unknown IF_DATA kind `{tag}`"))
    })?;

    let value = match &member.ty {
        Some(ty) => parse_type(s, a2ml, ty)?,
        None => IfValue::Struct(IfStruct::default()),
    };

    // Anything left before /end means data the schema cannot place.
    if !s.at(TokenKind::End) {
        let found = s.peek();
        return Err(Error::schema(
            found.position(),
            format!("unexpected {} in IF_DATA", found.describe()),
        ));
    }
    s.bump();
    let end = s.expect(TokenKind::Keyword, "`IF_DATA` after /end")?;
    if end.text() != "IF_DATA" {
        return Err(Error::format(
            end.position(),
            format!("expected `/end IF_DATA`, found `/end {}`", end.text()),
        ));
    }

    let mut node = Node::new(schema::if_data_schema(), position);
    node.if_data = Some(IfDataContent { tag, value });
    Ok(node)
}

fn parse_type(s: &mut Stream, a2ml: &A2ml, ty: &TypeName) -> Result<IfValue, Error> {
    let ty = resolve(s, a2ml, ty)?;
    match ty {
        TypeName::Predefined(predefined) => parse_scalar(s, *predefined),
        TypeName::Enum(e) => {
            let token = s.peek();
            let matches_kind = matches!(
                token.kind(),
                TokenKind::Ident | TokenKind::Keyword | TokenKind::Str
            );
            if !matches_kind {
                return Err(Error::schema(
                    token.position(),
                    format!("expected an enumerator, found {}", token.describe()),
                ));
            }
            let position = token.position();
            let token = s.bump();
            if !e.enumerators.iter().any(|(name, _)| name == token.text()) {
                return Err(Error::schema(
                    position,
                    format!("`{}` is not an enumerator of this type", token.text()),
                ));
            }
            Ok(IfValue::Scalar(Value::Ident(token.text().to_string())))
        }
        TypeName::Struct(st) => {
            s.enter()?;
            let mut out = IfStruct::default();
            for member in &st.members {
                if !member.dims.is_empty() {
                    out.items.push(parse_array(s, a2ml, &member.ty, &member.dims)?);
                    continue;
                }
                match resolve(s, a2ml, &member.ty)? {
                    // Compound members merge into the enclosing fragment:
                    // their items extend the item list and their tags land
                    // on this fragment directly.
                    TypeName::Struct(_) | TypeName::TaggedStruct(_) | TypeName::TaggedUnion(_) => {
                        match parse_type(s, a2ml, &member.ty)? {
                            IfValue::Struct(inner) => {
                                out.items.extend(inner.items);
                                for (tag, entry) in inner.tagged {
                                    merge_tagged(&mut out, tag, entry);
                                }
                            }
                            other => out.items.push(other),
                        }
                    }
                    _ => out.items.push(parse_type(s, a2ml, &member.ty)?),
                }
            }
            s.leave();
            Ok(IfValue::Struct(out))
        }
        TypeName::TaggedStruct(ts) => {
            s.enter()?;
            let mut out = IfStruct::default();
            loop {
                let (tag, block) = match s.peek().kind() {
                    TokenKind::Ident | TokenKind::Keyword => (s.peek().text(), false),
                    TokenKind::Begin
                        if matches!(
                            s.peek_second().kind(),
                            TokenKind::Ident | TokenKind::Keyword
                        ) =>
                    {
                        (s.peek_second().text(), true)
                    }
                    _ => break,
                };
                let Some(member) = ts
                    .members
                    .iter()
                    .find(|m| m.tag == tag && m.block == block)
                else {
                    // An unknown tag ends this tagged struct; whether it is
                    // an error is the enclosing context's call.
                    break;
                };
                let position = s.position();
                if !member.repeated && out.tagged.contains_key(&member.tag) {
                    return Err(Error::schema(
                        position,
                        format!("tag `{}` may occur at most once", member.tag),
                    ));
                }

                if block {
                    s.bump();
                    s.bump();
                } else {
                    s.bump();
                }
                let value = match &member.ty {
                    Some(ty) => Some(parse_type(s, a2ml, ty)?),
                    None => None,
                };
                if block {
                    s.expect(TokenKind::End, "/end")?;
                    let end = s.bump();
                    if end.text() != member.tag {
                        return Err(Error::schema(
                            end.position(),
                            format!(
                                "expected `/end {}`, found `/end {}`",
                                member.tag,
                                end.text()
                            ),
                        ));
                    }
                }

                let entry = out.tagged.entry(member.tag.clone()).or_insert(IfTagged {
                    block: member.block,
                    repeated: member.repeated,
                    values: Vec::new(),
                });
                entry.values.extend(value);
            }
            s.leave();
            Ok(IfValue::Struct(out))
        }
        TypeName::TaggedUnion(union) => {
            s.enter()?;
            let token = s.peek();
            if !matches!(token.kind(), TokenKind::Ident | TokenKind::Keyword)
                && !(token.kind() == TokenKind::Begin)
            {
                return Err(Error::schema(
                    token.position(),
                    format!("expected a union tag, found {}", token.describe()),
                ));
            }
            let block = token.kind() == TokenKind::Begin;
            let tag_text = if block {
                s.peek_second().text().to_string()
            } else {
                token.text().to_string()
            };
            let member = union
                .members
                .iter()
                .find(|m| m.tag == tag_text && m.block == block)
                .ok_or_else(|| {
                    Error::schema(
                        s.position(),
                        format!("`{tag_text}` is not a member of this taggedunion"),
                    )
                })?;
            if block {
                s.bump();
            }
            s.bump();
            let value = match &member.ty {
                Some(ty) => Some(parse_type(s, a2ml, ty)?),
                None => None,
            };
            if block {
                s.expect(TokenKind::End, "/end")?;
                let end = s.bump();
                if end.text() != member.tag {
                    return Err(Error::schema(
                        end.position(),
                        format!("expected `/end {}`, found `/end {}`", member.tag, end.text()),
                    ));
                }
            }
            let mut out = IfStruct::default();
            let entry = IfTagged {
                block: member.block,
                repeated: false,
                values: value.into_iter().collect(),
            };
            out.tagged.insert(member.tag.clone(), entry);
            s.leave();
            Ok(IfValue::Struct(out))
        }
        TypeName::Named(_) => unreachable!("resolve() returns concrete types"),
    }
}

fn merge_tagged(out: &mut IfStruct, tag: String, entry: IfTagged) {
    match out.tagged.entry(tag) {
        indexmap::map::Entry::Occupied(mut slot) => {
            slot.get_mut().values.extend(entry.values);
        }
        indexmap::map::Entry::Vacant(slot) => {
            slot.insert(entry);
        }
    }
}

fn resolve<'a>(s: &Stream, a2ml: &'a A2ml, ty: &'a TypeName) -> Result<&'a TypeName, Error> {
    a2ml.resolve(ty).ok_or_else(|| {
        let name = match ty {
            TypeName::Named(name) => name.as_str(),
            _ => "?",
        };
        Error::schema(s.position(), format!("unresolved type name `{name}`"))
    })
}

fn parse_scalar(s: &mut Stream, predefined: Predefined) -> Result<IfValue, Error> {
    let token = s.peek();
    let position = token.position();
    let value = match predefined {
        // `char` admits names and quoted strings; a character array is a
        // single string-like token, not N characters.
        Predefined::Char => match token.kind() {
            TokenKind::Ident | TokenKind::Keyword => Value::Ident(s.bump().text().to_string()),
            TokenKind::Str => Value::Str(s.bump().text().to_string()),
            TokenKind::Int => int_value(s)?,
            _ => {
                return Err(Error::schema(
                    position,
                    format!("expected a char value, found {}", token.describe()),
                ))
            }
        },
        p if p.is_integer() => match token.kind() {
            TokenKind::Int => int_value(s)?,
            TokenKind::Float => int_value(s)?,
            _ => {
                return Err(Error::schema(
                    position,
                    format!(
                        "expected a {} value, found {}",
                        predefined.name(),
                        token.describe()
                    ),
                ))
            }
        },
        _ => match token.kind() {
            TokenKind::Int | TokenKind::Float => {
                let token = s.bump();
                let parsed = float_text(token.text()).ok_or_else(|| {
                    Error::schema(position, format!("malformed number `{}`", token.text()))
                })?;
                Value::float(parsed)
            }
            _ => {
                return Err(Error::schema(
                    position,
                    format!(
                        "expected a {} value, found {}",
                        predefined.name(),
                        token.describe()
                    ),
                ))
            }
        },
    };
    Ok(IfValue::Scalar(value))
}

fn int_value(s: &mut Stream) -> Result<Value, Error> {
    let token = s.bump();
    let position = token.position();
    match token.kind() {
        TokenKind::Int => crate::parser::parse_int(token.text())
            .map(Value::Int)
            .ok_or_else(|| {
                Error::schema(position, format!("integer `{}` out of range", token.text()))
            }),
        _ => {
            // The documented coercion: a float literal with a zero
            // fractional part is accepted where an integer is required.
            let parsed = float_text(token.text()).filter(|v| v.fract() == 0.0);
            parsed.map(|v| Value::Int(v as i64)).ok_or_else(|| {
                Error::schema(
                    position,
                    format!("expected an integer, found `{}`", token.text()),
                )
            })
        }
    }
}

fn float_text(text: &str) -> Option<f64> {
    if let Some(v) = crate::parser::parse_int(text) {
        return Some(v as f64);
    }
    text.parse::<f64>().ok()
}

fn parse_array(
    s: &mut Stream,
    a2ml: &A2ml,
    ty: &TypeName,
    dims: &[u32],
) -> Result<IfValue, Error> {
    if dims.is_empty() {
        return parse_type(s, a2ml, ty);
    }
    if let TypeName::Predefined(Predefined::Char) = resolve(s, a2ml, ty)? {
        if dims.len() == 1 {
            // A char array is one string-like value regardless of the
            // declared capacity.
            return parse_scalar(s, Predefined::Char);
        }
    }
    let mut values = Vec::with_capacity(dims[0] as usize);
    for _ in 0..dims[0] {
        values.push(parse_array(s, a2ml, ty, &dims[1..])?);
    }
    Ok(IfValue::Sequence(values))
}
