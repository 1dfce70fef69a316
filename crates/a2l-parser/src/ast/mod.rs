mod dump;

pub use dump::Dump;

use std::fmt;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use triomphe::Arc;

use crate::a2ml::A2ml;
use crate::a2ml::IfValue;
use crate::schema::BlockSchema;
use crate::source::SourceMap;
use crate::{FileId, Position};

/// A scalar attribute value.
///
/// Floats are wrapped in [`OrderedFloat`] so values are `Eq` and `Hash` and
/// two parses of the same input compare equal attribute by attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Ident(String),
    Str(String),
    Int(i64),
    Float(OrderedFloat<f64>),
}

impl Value {
    pub(crate) fn float(v: f64) -> Value {
        Value::Float(OrderedFloat(v))
    }

    /// The text of an identifier or string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Ident(s) | Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, coercing integers to float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(v.0),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way `dump` writes it: strings quoted, floats
    /// always with a decimal point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Ident(s) => f.write_str(s),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{:?}", v.0),
        }
    }
}

/// Owned storage behind one attribute of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttrValue {
    Value(Value),
    Values(Vec<Value>),
    Rows(Vec<Vec<Value>>),
    Node(Node),
    Nodes(Vec<Node>),
    Flag(&'static str),
    A2ml(Arc<A2ml>),
}

/// A borrowed view of one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attr<'a> {
    /// A single scalar: a positional field or a scalar element.
    Value(&'a Value),
    /// A scalar list: a repeatable scalar element, a fixed run, or a tail.
    Values(&'a [Value]),
    /// Fixed-width rows, e.g. the value pairs of `COMPU_VTAB`.
    Rows(&'a [Vec<Value>]),
    /// A singleton child node.
    Node(&'a Node),
    /// A repeatable child node list, in input order.
    Nodes(&'a [Node]),
    /// A flag keyword that was present; the value is the keyword text.
    Flag(&'a str),
    /// The A2ML schema attached to a module.
    A2ml(&'a A2ml),
    /// The interpreted content of an `IF_DATA` node, keyed by its tag.
    IfData(&'a IfValue),
}

const NO_NODES: &[Node] = &[];
const NO_VALUES: &[Value] = &[];

/// The content of an `IF_DATA` node: the tag that selected the
/// `taggedunion` arm, and the fragment parsed against that arm's type.
#[derive(Debug, Clone, PartialEq)]
pub struct IfDataContent {
    pub tag: String,
    pub value: IfValue,
}

/// One parsed A2L construct.
///
/// A node exposes exactly the attributes its schema declares: positional
/// fields are always present, missing optional singletons read as `None`,
/// and missing repeatables read as an empty list. Nodes are immutable after
/// the parse; the tree owns its children.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) schema: &'static BlockSchema,
    pub(crate) position: Position,
    pub(crate) positional: Vec<Value>,
    pub(crate) attrs: IndexMap<&'static str, AttrValue>,
    pub(crate) if_data: Option<IfDataContent>,
}

impl Node {
    /// The A2L keyword this node was parsed from, e.g. `"CHARACTERISTIC"`.
    pub fn kind_name(&self) -> &'static str {
        self.schema.keyword()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Declared attribute names, in schema order. For an `IF_DATA` node
    /// this is the single dynamic tag.
    pub fn properties(&self) -> Vec<&str> {
        if let Some(content) = &self.if_data {
            return vec![content.tag.as_str()];
        }
        self.schema.property_names().collect()
    }

    /// Look up one attribute by name.
    pub fn attribute(&self, name: &str) -> Option<Attr<'_>> {
        if let Some(content) = &self.if_data {
            if content.tag == name {
                return Some(Attr::IfData(&content.value));
            }
        }
        if let Some(i) = self
            .schema
            .positional
            .iter()
            .position(|(field, _)| *field == name)
        {
            return self.positional.get(i).map(Attr::Value);
        }
        if let Some(stored) = self.attrs.get(name) {
            return Some(match stored {
                AttrValue::Value(v) => Attr::Value(v),
                AttrValue::Values(v) => Attr::Values(v),
                AttrValue::Rows(v) => Attr::Rows(v),
                AttrValue::Node(n) => Attr::Node(n),
                AttrValue::Nodes(n) => Attr::Nodes(n),
                AttrValue::Flag(text) => Attr::Flag(text),
                AttrValue::A2ml(a2ml) => Attr::A2ml(a2ml),
            });
        }
        // Absent repeatables present as empty sequences.
        if let Some(elem) = self.schema.elems.iter().find(|e| e.attr == name) {
            if elem.many {
                return Some(match elem.kind {
                    crate::schema::ElemKind::Scalar(_) => Attr::Values(NO_VALUES),
                    _ => Attr::Nodes(NO_NODES),
                });
            }
        }
        None
    }

    /// Positional field by index, in declaration order.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self.attribute(name)? {
            Attr::Value(v) => v.as_str(),
            Attr::Flag(text) => Some(text),
            _ => None,
        }
    }

    pub fn int_field(&self, name: &str) -> Option<i64> {
        match self.attribute(name)? {
            Attr::Value(v) => v.as_int(),
            _ => None,
        }
    }

    pub fn float_field(&self, name: &str) -> Option<f64> {
        match self.attribute(name)? {
            Attr::Value(v) => v.as_f64(),
            _ => None,
        }
    }

    /// A singleton child node, `None` when absent.
    pub fn child(&self, name: &str) -> Option<&Node> {
        match self.attribute(name)? {
            Attr::Node(n) => Some(n),
            _ => None,
        }
    }

    /// A repeatable child list; empty when no instance was present.
    pub fn children(&self, name: &str) -> &[Node] {
        match self.attribute(name) {
            Some(Attr::Nodes(nodes)) => nodes,
            Some(Attr::Node(node)) => std::slice::from_ref(node),
            _ => NO_NODES,
        }
    }

    /// Whether a flag keyword was present under this node.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.attribute(name), Some(Attr::Flag(_)))
    }

    /// A scalar list attribute (repeatable scalar, fixed run, or tail).
    pub fn values(&self, name: &str) -> &[Value] {
        match self.attribute(name) {
            Some(Attr::Values(values)) => values,
            _ => NO_VALUES,
        }
    }

    /// Row-shaped tail data, e.g. `COMPU_VTAB`'s value pairs.
    pub fn rows(&self, name: &str) -> &[Vec<Value>] {
        match self.attribute(name) {
            Some(Attr::Rows(rows)) => rows,
            _ => &[],
        }
    }

    /// The A2ML schema stored on a module, if one was declared.
    pub fn a2ml(&self) -> Option<&Arc<A2ml>> {
        match self.attrs.get("a2ml") {
            Some(AttrValue::A2ml(a2ml)) => Some(a2ml),
            _ => None,
        }
    }

    /// Tag and fragment of an `IF_DATA` node.
    pub fn if_data_content(&self) -> Option<&IfDataContent> {
        self.if_data.as_ref()
    }

    fn collect<'a>(&'a self, kind: &str, out: &mut Vec<&'a Node>) {
        if self.kind_name() == kind {
            out.push(self);
        }
        for elem in self.schema.elems {
            match self.attrs.get(elem.attr) {
                Some(AttrValue::Node(node)) => node.collect(kind, out),
                Some(AttrValue::Nodes(nodes)) => {
                    for node in nodes {
                        node.collect(kind, out);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Structural equality: same kind, same attributes. Source positions are
/// ignored so that a re-parse of `dump` output compares equal to the
/// original tree.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.positional == other.positional
            && self.attrs == other.attrs
            && self.if_data == other.if_data
    }
}

impl Node {
    pub(crate) fn new(schema: &'static BlockSchema, position: Position) -> Node {
        Node {
            schema,
            position,
            positional: Vec::new(),
            attrs: IndexMap::new(),
            if_data: None,
        }
    }
}

/// The root of a parsed A2L file.
///
/// An empty input yields an `Ast` with all three top-level constructs
/// absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub(crate) a2ml_version: Option<Node>,
    pub(crate) asap2_version: Option<Node>,
    pub(crate) project: Option<Node>,
    pub(crate) sources: SourceMap,
}

impl Ast {
    pub fn a2ml_version(&self) -> Option<&Node> {
        self.a2ml_version.as_ref()
    }

    pub fn asap2_version(&self) -> Option<&Node> {
        self.asap2_version.as_ref()
    }

    pub fn project(&self) -> Option<&Node> {
        self.project.as_ref()
    }

    /// The name of the file behind a [`FileId`], for resolving error and
    /// node positions of included files.
    pub fn source_name(&self, file: FileId) -> Option<&str> {
        self.sources.name(file)
    }

    /// All nodes of the given kind, in preorder.
    ///
    /// Traversal follows declared child attributes only; scalar fields and
    /// the interior of `IF_DATA` fragments are not visited.
    pub fn nodes(&self, kind: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        for root in [&self.a2ml_version, &self.asap2_version, &self.project]
            .into_iter()
            .flatten()
        {
            root.collect(kind, &mut out);
        }
        out
    }

    /// Lazy re-emission as `(indent level, line)` pairs.
    pub fn dump(&self) -> Dump<'_> {
        Dump::new(self)
    }

    /// Join [`Ast::dump`] into a string with the given indentation width,
    /// line ending and indentation character.
    pub fn render(&self, indent: usize, line_ending: &str, indent_char: char) -> String {
        let mut out = String::new();
        for (level, line) in self.dump() {
            if !out.is_empty() {
                out.push_str(line_ending);
            }
            for _ in 0..indent * level {
                out.push(indent_char);
            }
            out.push_str(&line);
        }
        out
    }

    /// [`Ast::render`] with the conventional defaults: four spaces and `\n`.
    pub fn render_default(&self) -> String {
        self.render(4, "\n", ' ')
    }
}
