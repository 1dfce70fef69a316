//! Lazy textual re-emission of the tree.
//!
//! [`Dump`] is a restartable iterator over `(indent level, line)` pairs; it
//! never materializes the whole output. Lines follow schema order:
//! positional fields on the `/begin` line, tail values and rows on their
//! own lines, then singletons and repeatables as declared.

use crate::a2ml::{A2ml, Declaration, IfStruct, IfValue, TypeName};
use crate::schema::Tail;

use super::{Ast, AttrValue, Node, Value};

pub struct Dump<'a> {
    stack: Vec<Task<'a>>,
}

enum Task<'a> {
    Text(usize, String),
    Node(usize, &'a Node),
}

impl<'a> Dump<'a> {
    pub(crate) fn new(ast: &'a Ast) -> Dump<'a> {
        let mut stack = Vec::new();
        // Popped in reverse push order.
        if let Some(project) = &ast.project {
            stack.push(Task::Node(0, project));
        }
        if let Some(version) = &ast.asap2_version {
            stack.push(Task::Node(0, version));
        }
        if let Some(version) = &ast.a2ml_version {
            stack.push(Task::Node(0, version));
        }
        Dump { stack }
    }

    fn expand(&mut self, indent: usize, node: &'a Node) {
        if !node.schema.block {
            self.stack.push(Task::Text(indent, inline_line(node)));
            return;
        }

        let mut body: Vec<Task<'a>> = Vec::new();
        push_tail_lines(node, indent + 1, &mut body);
        for elem in node.schema.elems {
            match node.attrs.get(elem.attr) {
                Some(AttrValue::Value(value)) => {
                    body.push(Task::Text(indent + 1, format!("{} {}", elem.keyword, value)));
                }
                Some(AttrValue::Values(values)) => {
                    for value in values {
                        body.push(Task::Text(indent + 1, format!("{} {}", elem.keyword, value)));
                    }
                }
                Some(AttrValue::Flag(text)) => {
                    body.push(Task::Text(indent + 1, text.to_string()));
                }
                Some(AttrValue::Node(child)) => {
                    body.push(Task::Node(indent + 1, child));
                }
                Some(AttrValue::Nodes(children)) => {
                    for child in children {
                        body.push(Task::Node(indent + 1, child));
                    }
                }
                Some(AttrValue::A2ml(a2ml)) => {
                    body.push(Task::Text(indent + 1, "/begin A2ML".to_string()));
                    let mut lines = Vec::new();
                    a2ml_lines(a2ml, indent + 2, &mut lines);
                    body.extend(lines.into_iter().map(|(i, l)| Task::Text(i, l)));
                    body.push(Task::Text(indent + 1, "/end A2ML".to_string()));
                }
                Some(AttrValue::Rows(_)) | None => {}
            }
        }
        if let Some(content) = &node.if_data {
            let mut lines = Vec::new();
            fragment_lines(&content.value, indent + 1, &mut lines);
            body.extend(lines.into_iter().map(|(i, l)| Task::Text(i, l)));
        }

        self.stack
            .push(Task::Text(indent, format!("/end {}", node.schema.keyword)));
        for task in body.into_iter().rev() {
            self.stack.push(task);
        }
        self.stack.push(Task::Text(indent, begin_line(node)));
    }
}

impl Iterator for Dump<'_> {
    type Item = (usize, String);

    fn next(&mut self) -> Option<(usize, String)> {
        loop {
            match self.stack.pop()? {
                Task::Text(indent, line) => return Some((indent, line)),
                Task::Node(indent, node) => self.expand(indent, node),
            }
        }
    }
}

/// The `/begin` line: keyword plus positional and fixed values, or the
/// selecting tag for `IF_DATA`.
fn begin_line(node: &Node) -> String {
    let mut line = format!("/begin {}", node.schema.keyword);
    if let Some(content) = &node.if_data {
        line.push(' ');
        line.push_str(&content.tag);
        return line;
    }
    push_head_values(node, &mut line);
    line
}

fn inline_line(node: &Node) -> String {
    let mut line = node.schema.keyword.to_string();
    push_head_values(node, &mut line);
    if let Some(attr) = node.schema.tail.attr() {
        if let Some(AttrValue::Values(values)) = node.attrs.get(attr) {
            for value in values {
                line.push(' ');
                line.push_str(&value.to_string());
            }
        }
    }
    line
}

fn push_head_values(node: &Node, line: &mut String) {
    for value in &node.positional {
        line.push(' ');
        line.push_str(&value.to_string());
    }
    if let Some((attr, _, _)) = node.schema.fixed {
        if let Some(AttrValue::Values(values)) = node.attrs.get(attr) {
            for value in values {
                line.push(' ');
                line.push_str(&value.to_string());
            }
        }
    }
}

fn push_tail_lines<'a>(node: &'a Node, indent: usize, out: &mut Vec<Task<'a>>) {
    let Some(attr) = node.schema.tail.attr() else {
        return;
    };
    match (node.schema.tail, node.attrs.get(attr)) {
        (Tail::Rows(..), Some(AttrValue::Rows(rows))) => {
            for row in rows {
                out.push(Task::Text(indent, join_values(row)));
            }
        }
        (_, Some(AttrValue::Values(values))) => {
            for value in values {
                out.push(Task::Text(indent, value.to_string()));
            }
        }
        _ => {}
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

// --- IF_DATA fragments ----------------------------------------------------

fn fragment_lines(value: &IfValue, indent: usize, out: &mut Vec<(usize, String)>) {
    match value {
        IfValue::Scalar(_) | IfValue::Sequence(_) => {
            let mut parts = Vec::new();
            inline_parts(value, &mut parts);
            out.push((indent, parts.join(" ")));
        }
        IfValue::Struct(fragment) => {
            if !fragment.items.is_empty() {
                let mut parts = Vec::new();
                for item in &fragment.items {
                    inline_parts(item, &mut parts);
                }
                out.push((indent, parts.join(" ")));
            }
            for (tag, entry) in &fragment.tagged {
                if entry.values.is_empty() {
                    out.push((indent, tag.clone()));
                    continue;
                }
                for value in &entry.values {
                    if entry.block {
                        out.push((indent, format!("/begin {tag}")));
                        fragment_lines(value, indent + 1, out);
                        out.push((indent, format!("/end {tag}")));
                    } else {
                        emit_inline_tagged(tag, value, indent, out);
                    }
                }
            }
        }
    }
}

/// A non-block tagged member: scalars stay on the tag's line, nested tags
/// follow on their own lines. Whitespace is insignificant on re-parse, so
/// the split only affects readability.
fn emit_inline_tagged(tag: &str, value: &IfValue, indent: usize, out: &mut Vec<(usize, String)>) {
    match value {
        IfValue::Struct(fragment) if !fragment.tagged.is_empty() => {
            let mut parts = vec![tag.to_string()];
            for item in &fragment.items {
                inline_parts(item, &mut parts);
            }
            out.push((indent, parts.join(" ")));
            let nested = IfValue::Struct(IfStruct {
                items: Vec::new(),
                tagged: fragment.tagged.clone(),
            });
            fragment_lines(&nested, indent + 1, out);
        }
        _ => {
            let mut parts = vec![tag.to_string()];
            inline_parts(value, &mut parts);
            out.push((indent, parts.join(" ")));
        }
    }
}

fn inline_parts(value: &IfValue, parts: &mut Vec<String>) {
    match value {
        IfValue::Scalar(v) => parts.push(v.to_string()),
        IfValue::Sequence(values) => {
            for value in values {
                inline_parts(value, parts);
            }
        }
        IfValue::Struct(fragment) => {
            for item in &fragment.items {
                inline_parts(item, parts);
            }
        }
    }
}

// --- A2ML declarations ----------------------------------------------------

fn a2ml_lines(a2ml: &A2ml, indent: usize, out: &mut Vec<(usize, String)>) {
    for declaration in &a2ml.declarations {
        match declaration {
            Declaration::Block(block) => {
                let prefix = format!("block \"{}\" ", block.tag);
                type_lines(&block.ty, indent, &prefix, ";", out);
            }
            Declaration::Type(ty) => type_lines(ty, indent, "", ";", out),
        }
    }
}

/// Emit a type expression, merging `prefix` into the first line and
/// appending `suffix` to the last.
fn type_lines(
    ty: &TypeName,
    indent: usize,
    prefix: &str,
    suffix: &str,
    out: &mut Vec<(usize, String)>,
) {
    match ty {
        TypeName::Predefined(p) => out.push((indent, format!("{prefix}{}{suffix}", p.name()))),
        TypeName::Named(name) => out.push((indent, format!("{prefix}{name}{suffix}"))),
        TypeName::Enum(e) => {
            out.push((indent, format!("{prefix}enum {}{{", named(&e.name))));
            for (i, (tag, value)) in e.enumerators.iter().enumerate() {
                let comma = if i + 1 < e.enumerators.len() { "," } else { "" };
                let line = match value {
                    Some(value) => format!("\"{tag}\" = {value}{comma}"),
                    None => format!("\"{tag}\"{comma}"),
                };
                out.push((indent + 1, line));
            }
            out.push((indent, format!("}}{suffix}")));
        }
        TypeName::Struct(st) => {
            out.push((indent, format!("{prefix}struct {}{{", named(&st.name))));
            for member in &st.members {
                let mut member_suffix = String::new();
                for dim in &member.dims {
                    member_suffix.push_str(&format!("[{dim}]"));
                }
                member_suffix.push(';');
                type_lines(&member.ty, indent + 1, "", &member_suffix, out);
            }
            out.push((indent, format!("}}{suffix}")));
        }
        TypeName::TaggedStruct(ts) => {
            out.push((indent, format!("{prefix}taggedstruct {}{{", named(&ts.name))));
            for member in &ts.members {
                let mut head = String::new();
                if member.repeated {
                    head.push('(');
                }
                if member.block {
                    head.push_str("block ");
                }
                head.push_str(&format!("\"{}\"", member.tag));
                let member_suffix = if member.repeated { ")*;" } else { ";" };
                match &member.ty {
                    Some(ty) => {
                        head.push(' ');
                        type_lines(ty, indent + 1, &head, member_suffix, out);
                    }
                    None => out.push((indent + 1, format!("{head}{member_suffix}"))),
                }
            }
            out.push((indent, format!("}}{suffix}")));
        }
        TypeName::TaggedUnion(union) => {
            out.push((indent, format!("{prefix}taggedunion {}{{", named(&union.name))));
            for member in &union.members {
                let mut head = String::new();
                if member.block {
                    head.push_str("block ");
                }
                head.push_str(&format!("\"{}\"", member.tag));
                match &member.ty {
                    Some(ty) => {
                        head.push(' ');
                        type_lines(ty, indent + 1, &head, ";", out);
                    }
                    None => out.push((indent + 1, format!("{head};"))),
                }
            }
            out.push((indent, format!("}}{suffix}")));
        }
    }
}

fn named(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("{name} "),
        None => String::new(),
    }
}
