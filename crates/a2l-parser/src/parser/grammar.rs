//! File scope and the generic, table-driven block parse.
//!
//! Every construct is parsed by the same algorithm, steered by its
//! [`BlockSchema`]: positional fields in fixed order, then an optional
//! variable tail, then a free-order region of optional elements, closed by
//! a matching `/end`. The two embedded languages — A2ML declarations and
//! schema-directed IF_DATA — are dispatched from the free-order region.

use indexmap::IndexMap;
use triomphe::Arc;

use crate::a2ml;
use crate::ast::{Ast, AttrValue, Node, Value};
use crate::lexer::TokenKind;
use crate::schema::{self, BlockSchema, Elem, ElemKind, Scalar, Tail};
use crate::source::SourceMap;
use crate::{Error, Position};

use super::{NodeFactory, Stream};

pub(crate) struct Ctx<'a> {
    overrides: &'a IndexMap<String, NodeFactory>,
    /// The A2ML schema of the module currently being parsed, consulted by
    /// every IF_DATA block underneath it.
    current_a2ml: Option<Arc<a2ml::A2ml>>,
}

/// At file scope at most one each of `A2ML_VERSION`, `ASAP2_VERSION` and
/// `PROJECT` may appear, in any order. An empty source is a valid file
/// with all three absent.
pub(crate) fn file(
    s: &mut Stream,
    overrides: &IndexMap<String, NodeFactory>,
    sources: SourceMap,
) -> Result<Ast, Error> {
    let mut ctx = Ctx {
        overrides,
        current_a2ml: None,
    };
    let mut ast = Ast {
        a2ml_version: None,
        asap2_version: None,
        project: None,
        sources,
    };

    loop {
        let token = s.peek();
        let position = token.position();
        match token.kind() {
            TokenKind::Eof => break,
            TokenKind::Keyword if token.text() == "A2ML_VERSION" => {
                check_absent(ast.a2ml_version.is_none(), position, "A2ML_VERSION")?;
                s.bump();
                let node = parse_node(s, lookup("A2ML_VERSION"), position, &mut ctx)?;
                ast.a2ml_version = Some(node);
            }
            TokenKind::Keyword if token.text() == "ASAP2_VERSION" => {
                check_absent(ast.asap2_version.is_none(), position, "ASAP2_VERSION")?;
                s.bump();
                let node = parse_node(s, lookup("ASAP2_VERSION"), position, &mut ctx)?;
                ast.asap2_version = Some(node);
            }
            TokenKind::Begin => {
                let keyword = s.peek_second();
                if keyword.text() != "PROJECT" {
                    return Err(Error::format(
                        keyword.position(),
                        format!("expected `PROJECT` after /begin, found {}", keyword.describe()),
                    ));
                }
                check_absent(ast.project.is_none(), position, "PROJECT")?;
                s.bump();
                s.bump();
                let node = parse_node(s, lookup("PROJECT"), position, &mut ctx)?;
                ast.project = Some(node);
            }
            _ => {
                return Err(Error::format(
                    position,
                    format!(
                        "expected `A2ML_VERSION`, `ASAP2_VERSION` or `/begin PROJECT`, found {}",
                        token.describe()
                    ),
                ))
            }
        }
    }
    Ok(ast)
}

fn lookup(keyword: &str) -> &'static BlockSchema {
    schema::schema(keyword).expect("keyword is in the grammar table")
}

fn check_absent(absent: bool, position: Position, keyword: &str) -> Result<(), Error> {
    if absent {
        Ok(())
    } else {
        Err(Error::format(
            position,
            format!("duplicate `{keyword}`"),
        ))
    }
}

/// Parse one construct whose introducing keyword (and `/begin`, for block
/// constructs) has already been consumed.
fn parse_node(
    s: &mut Stream,
    schema: &'static BlockSchema,
    position: Position,
    ctx: &mut Ctx,
) -> Result<Node, Error> {
    s.enter()?;
    let mut node = Node::new(schema, position);

    for (field, kind) in schema.positional {
        let value = coerce(s, *kind, schema.keyword, field)?;
        node.positional.push(value);
    }
    if let Some((attr, kind, count)) = schema.fixed {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(coerce(s, kind, schema.keyword, attr)?);
        }
        node.attrs.insert(attr, AttrValue::Values(values));
    }
    parse_tail(s, schema, &mut node)?;

    if schema.block {
        // IF_DATA inside a module resolves against that module's A2ML
        // schema; entering a module opens a fresh scope.
        let saved = if schema.keyword == "MODULE" {
            Some(ctx.current_a2ml.take())
        } else {
            None
        };
        let body = free_order(s, schema, &mut node, ctx);
        if let Some(saved) = saved {
            ctx.current_a2ml = saved;
        }
        body?;
    }

    s.leave();
    Ok(finish(node, ctx))
}

fn parse_tail(s: &mut Stream, schema: &'static BlockSchema, node: &mut Node) -> Result<(), Error> {
    let (attr, stored) = match schema.tail {
        Tail::None => return Ok(()),
        Tail::Idents(attr) => {
            let mut values = Vec::new();
            while s.at(TokenKind::Ident) {
                values.push(Value::Ident(s.bump().text().to_string()));
            }
            (attr, AttrValue::Values(values))
        }
        Tail::Strings(attr) => {
            let mut values = Vec::new();
            while s.at(TokenKind::Str) {
                values.push(Value::Str(s.bump().text().to_string()));
            }
            (attr, AttrValue::Values(values))
        }
        Tail::Ints(attr) => {
            let mut values = Vec::new();
            while starts_scalar(s.peek().kind(), Scalar::Int) {
                values.push(coerce(s, Scalar::Int, schema.keyword, attr)?);
            }
            (attr, AttrValue::Values(values))
        }
        Tail::Floats(attr) => {
            let mut values = Vec::new();
            while starts_scalar(s.peek().kind(), Scalar::Float) {
                values.push(coerce(s, Scalar::Float, schema.keyword, attr)?);
            }
            (attr, AttrValue::Values(values))
        }
        Tail::Rows(attr, cells) => {
            let mut rows = Vec::new();
            while starts_scalar(s.peek().kind(), cells[0]) {
                let mut row = Vec::with_capacity(cells.len());
                for cell in cells {
                    row.push(coerce(s, *cell, schema.keyword, attr)?);
                }
                rows.push(row);
            }
            (attr, AttrValue::Rows(rows))
        }
    };
    node.attrs.insert(attr, stored);
    Ok(())
}

fn free_order(
    s: &mut Stream,
    schema: &'static BlockSchema,
    node: &mut Node,
    ctx: &mut Ctx,
) -> Result<(), Error> {
    loop {
        let token = s.peek();
        let position = token.position();
        match token.kind() {
            TokenKind::End => {
                s.bump();
                let end = s.bump();
                if !matches!(end.kind(), TokenKind::Keyword | TokenKind::Ident) {
                    return Err(Error::format(
                        end.position(),
                        format!("expected a block keyword after /end, found {}", end.describe()),
                    ));
                }
                if end.text() != schema.keyword {
                    return Err(Error::format(
                        end.position(),
                        format!(
                            "expected `/end {}`, found `/end {}`",
                            schema.keyword,
                            end.text()
                        ),
                    ));
                }
                return Ok(());
            }
            TokenKind::Keyword => {
                let Some(elem) = schema.elem(token.text()) else {
                    return Err(Error::format(
                        position,
                        format!("unexpected `{}` inside {}", token.text(), schema.keyword),
                    ));
                };
                match elem.kind {
                    ElemKind::Flag => {
                        s.bump();
                        check_absent(!node.attrs.contains_key(elem.attr), position, elem.keyword)?;
                        node.attrs.insert(elem.attr, AttrValue::Flag(elem.keyword));
                    }
                    ElemKind::Scalar(kind) => {
                        s.bump();
                        let value = coerce(s, kind, schema.keyword, elem.attr)?;
                        if elem.many {
                            push_value(node, elem, value);
                        } else {
                            check_absent(
                                !node.attrs.contains_key(elem.attr),
                                position,
                                elem.keyword,
                            )?;
                            node.attrs.insert(elem.attr, AttrValue::Value(value));
                        }
                    }
                    ElemKind::Node(keyword) => {
                        let nested = lookup(keyword);
                        if nested.block {
                            return Err(Error::format(
                                position,
                                format!("`{keyword}` must be written as `/begin {keyword}`"),
                            ));
                        }
                        s.bump();
                        let child = parse_node(s, nested, position, ctx)?;
                        attach(node, elem, child, position)?;
                    }
                    ElemKind::A2ml | ElemKind::IfData => {
                        return Err(Error::format(
                            position,
                            format!(
                                "`{}` must be written as `/begin {}`",
                                elem.keyword, elem.keyword
                            ),
                        ));
                    }
                }
            }
            TokenKind::Begin => {
                let keyword = s.peek_second();
                if !matches!(keyword.kind(), TokenKind::Keyword | TokenKind::Ident) {
                    return Err(Error::format(
                        keyword.position(),
                        format!(
                            "expected a block keyword after /begin, found {}",
                            keyword.describe()
                        ),
                    ));
                }
                let Some(elem) = schema.elem(keyword.text()) else {
                    return Err(Error::format(
                        keyword.position(),
                        format!(
                            "unexpected `/begin {}` inside {}",
                            keyword.text(),
                            schema.keyword
                        ),
                    ));
                };
                match elem.kind {
                    ElemKind::A2ml => {
                        check_absent(!node.attrs.contains_key(elem.attr), position, "A2ML")?;
                        s.bump();
                        s.bump();
                        let parsed = a2ml::parse_a2ml(s)?;
                        s.expect(TokenKind::End, "/end A2ML")?;
                        let end = s.expect(TokenKind::Keyword, "`A2ML` after /end")?;
                        if end.text() != "A2ML" {
                            return Err(Error::format(
                                end.position(),
                                format!("expected `/end A2ML`, found `/end {}`", end.text()),
                            ));
                        }
                        let parsed = Arc::new(parsed);
                        ctx.current_a2ml = Some(parsed.clone());
                        node.attrs.insert(elem.attr, AttrValue::A2ml(parsed));
                    }
                    ElemKind::IfData => {
                        s.bump();
                        s.bump();
                        s.enter()?;
                        let child = a2ml::parse_if_data(s, ctx.current_a2ml.as_ref())?;
                        s.leave();
                        attach(node, elem, finish(child, ctx), position)?;
                    }
                    ElemKind::Node(nested_keyword) => {
                        let nested = lookup(nested_keyword);
                        if !nested.block {
                            return Err(Error::format(
                                position,
                                format!("`{nested_keyword}` is not a /begin block"),
                            ));
                        }
                        s.bump();
                        s.bump();
                        let child = parse_node(s, nested, position, ctx)?;
                        attach(node, elem, child, position)?;
                    }
                    _ => {
                        return Err(Error::format(
                            position,
                            format!("`{}` is not a /begin block", elem.keyword),
                        ));
                    }
                }
            }
            TokenKind::Eof => {
                return Err(Error::format(
                    position,
                    format!("missing `/end {}`", schema.keyword),
                ));
            }
            _ => {
                return Err(Error::format(
                    position,
                    format!(
                        "unexpected {} inside {}",
                        token.describe(),
                        schema.keyword
                    ),
                ));
            }
        }
    }
}

fn push_value(node: &mut Node, elem: &Elem, value: Value) {
    let entry = node
        .attrs
        .entry(elem.attr)
        .or_insert_with(|| AttrValue::Values(Vec::new()));
    if let AttrValue::Values(values) = entry {
        values.push(value);
    }
}

fn attach(node: &mut Node, elem: &Elem, child: Node, position: Position) -> Result<(), Error> {
    if elem.many {
        let entry = node
            .attrs
            .entry(elem.attr)
            .or_insert_with(|| AttrValue::Nodes(Vec::new()));
        if let AttrValue::Nodes(nodes) = entry {
            nodes.push(child);
        }
        return Ok(());
    }
    check_absent(!node.attrs.contains_key(elem.attr), position, elem.keyword)?;
    node.attrs.insert(elem.attr, AttrValue::Node(child));
    Ok(())
}

fn finish(node: Node, ctx: &Ctx) -> Node {
    match ctx.overrides.get(node.kind_name()) {
        Some(factory) => factory(node),
        None => node,
    }
}

fn starts_scalar(kind: TokenKind, scalar: Scalar) -> bool {
    match scalar {
        Scalar::Ident => kind == TokenKind::Ident,
        Scalar::Str => kind == TokenKind::Str,
        Scalar::Int | Scalar::Float => matches!(kind, TokenKind::Int | TokenKind::Float),
    }
}

/// Read one scalar of the declared kind, applying the numeric coercions:
/// a float literal with zero fractional part satisfies an integer field,
/// and an integer literal satisfies a float field.
fn coerce(s: &mut Stream, kind: Scalar, owner: &str, field: &str) -> Result<Value, Error> {
    let token = s.peek();
    let position = token.position();
    if !starts_scalar(token.kind(), kind) {
        let wanted = match kind {
            Scalar::Ident => "an identifier",
            Scalar::Str => "a string",
            Scalar::Int => "an integer",
            Scalar::Float => "a number",
        };
        return Err(Error::format(
            position,
            format!(
                "expected {wanted} for {owner} {field}, found {}",
                token.describe()
            ),
        ));
    }

    let token = s.bump();
    match kind {
        Scalar::Ident => Ok(Value::Ident(token.text().to_string())),
        Scalar::Str => Ok(Value::Str(token.text().to_string())),
        Scalar::Int => match token.kind() {
            TokenKind::Int => super::parse_int(token.text()).map(Value::Int).ok_or_else(|| {
                Error::format(
                    position,
                    format!("integer literal `{}` out of range", token.text()),
                )
            }),
            _ => {
                let parsed = token.text().parse::<f64>().ok();
                match parsed {
                    Some(v) if v.fract() == 0.0 => Ok(Value::Int(v as i64)),
                    _ => Err(Error::format(
                        position,
                        format!(
                            "expected an integer for {owner} {field}, found `{}`",
                            token.text()
                        ),
                    )),
                }
            }
        },
        Scalar::Float => match token.kind() {
            TokenKind::Int => super::parse_int(token.text())
                .map(|v| Value::float(v as f64))
                .ok_or_else(|| {
                    Error::format(
                        position,
                        format!("integer literal `{}` out of range", token.text()),
                    )
                }),
            _ => token
                .text()
                .parse::<f64>()
                .map(Value::float)
                .map_err(|_| {
                    Error::format(
                        position,
                        format!("malformed number `{}`", token.text()),
                    )
                }),
        },
    }
}
